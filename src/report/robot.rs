//! Robot Framework result reading
//!
//! Extracts test outcomes from an `output.xml` document. Only what the
//! combined xUnit report needs is read: suite nesting, test names and each
//! test's own `<status>` element.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::common::{Error, Result};

/// Final status of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseStatus {
    Pass,
    Fail,
    Skip,
}

impl CaseStatus {
    fn parse(value: &str) -> Self {
        match value {
            "PASS" => CaseStatus::Pass,
            "SKIP" | "NOT RUN" | "NOT_RUN" => CaseStatus::Skip,
            _ => CaseStatus::Fail,
        }
    }
}

/// A single test from a result file
#[derive(Debug, Clone, PartialEq)]
pub struct CaseResult {
    /// Dotted chain of enclosing suite names
    pub classname: String,
    pub name: String,
    pub status: CaseStatus,
    pub message: String,
    /// Seconds, when the result file records it
    pub elapsed: Option<f64>,
}

/// All tests from one result file
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteResult {
    /// Name of the top-level suite (file stem when missing)
    pub name: String,
    pub source: PathBuf,
    pub cases: Vec<CaseResult>,
}

impl SuiteResult {
    pub fn count(&self, status: CaseStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }
}

struct OpenTest {
    name: String,
    depth: usize,
    status: CaseStatus,
    message: String,
    elapsed: Option<f64>,
}

/// Read one `output.xml`
pub fn read_output(path: &Path) -> Result<SuiteResult> {
    let mut reader = Reader::from_file(path).map_err(|e| Error::result_parse(path, e))?;
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut suites: Vec<(String, usize)> = Vec::new();
    let mut top_suite: Option<String> = None;
    let mut test: Option<OpenTest> = None;
    let mut in_test_status = false;
    let mut cases = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| Error::result_parse(path, e))?;

        match event {
            Event::Start(e) => {
                let element_depth = depth;
                depth += 1;
                match e.name().as_ref() {
                    b"suite" => {
                        let name = attr(&e, b"name").unwrap_or_default();
                        top_suite.get_or_insert_with(|| name.clone());
                        suites.push((name, element_depth));
                    }
                    b"test" => {
                        test = Some(open_test(&e, element_depth));
                    }
                    b"status" => {
                        if let Some(t) = test.as_mut().filter(|t| element_depth == t.depth + 1) {
                            apply_status(t, &e);
                            in_test_status = true;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let element_depth = depth;
                match e.name().as_ref() {
                    b"status" => {
                        if let Some(t) = test.as_mut().filter(|t| element_depth == t.depth + 1) {
                            apply_status(t, &e);
                        }
                    }
                    b"test" => {
                        let t = open_test(&e, element_depth);
                        cases.push(close_test(t, &suites));
                    }
                    _ => {}
                }
            }
            Event::Text(text) => {
                if in_test_status {
                    if let Some(t) = test.as_mut() {
                        let text = text.unescape().map_err(|e| Error::result_parse(path, e))?;
                        t.message.push_str(&text);
                    }
                }
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                match e.name().as_ref() {
                    b"status" => in_test_status = false,
                    b"test" if test.as_ref().is_some_and(|t| t.depth == depth) => {
                        if let Some(t) = test.take() {
                            cases.push(close_test(t, &suites));
                        }
                    }
                    b"suite" => {
                        if suites.last().is_some_and(|(_, d)| *d == depth) {
                            suites.pop();
                        }
                    }
                    _ => {}
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let name = top_suite.filter(|n| !n.is_empty()).unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    Ok(SuiteResult {
        name,
        source: path.to_path_buf(),
        cases,
    })
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(Cow::into_owned))
}

fn open_test(e: &BytesStart<'_>, depth: usize) -> OpenTest {
    OpenTest {
        name: attr(e, b"name").unwrap_or_default(),
        depth,
        status: CaseStatus::Fail,
        message: String::new(),
        elapsed: None,
    }
}

fn apply_status(test: &mut OpenTest, e: &BytesStart<'_>) {
    test.status = CaseStatus::parse(attr(e, b"status").as_deref().unwrap_or(""));
    test.elapsed = attr(e, b"elapsed").and_then(|v| v.parse().ok());
    test.message.clear();
}

fn close_test(test: OpenTest, suites: &[(String, usize)]) -> CaseResult {
    let classname = suites
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>()
        .join(".");
    CaseResult {
        classname,
        name: test.name,
        status: test.status,
        message: test.message.trim().to_string(),
        elapsed: test.elapsed,
    }
}
