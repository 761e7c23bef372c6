//! Combined xUnit report writing

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use super::robot::{CaseStatus, SuiteResult};
use crate::common::{Error, Result};

/// Write all suites into one xUnit document at `dest`
///
/// The document has a combined root `<testsuite>` holding one nested
/// `<testsuite>` per source file. Nothing time-dependent is written, so the
/// same input always produces the same bytes.
pub fn write_combined(suites: &[SuiteResult], dest: &Path) -> Result<()> {
    let file = File::create(dest)?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 2);

    let total: usize = suites.iter().map(|s| s.cases.len()).sum();
    let failures: usize = suites.iter().map(|s| s.count(CaseStatus::Fail)).sum();
    let skipped: usize = suites.iter().map(|s| s.count(CaseStatus::Skip)).sum();
    let name = suites
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(" & ");

    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("testsuite");
    root.push_attribute(("name", name.as_str()));
    push_counts(&mut root, total, failures, skipped);
    write(&mut writer, Event::Start(root))?;

    for suite in suites {
        write_suite(&mut writer, suite)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("testsuite")))?;

    let mut out = writer.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn write_suite<W: Write>(writer: &mut Writer<W>, suite: &SuiteResult) -> Result<()> {
    let mut start = BytesStart::new("testsuite");
    start.push_attribute(("name", suite.name.as_str()));
    push_counts(
        &mut start,
        suite.cases.len(),
        suite.count(CaseStatus::Fail),
        suite.count(CaseStatus::Skip),
    );
    let source = suite.source.display().to_string();
    start.push_attribute(("file", source.as_str()));

    if suite.cases.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;

    for case in &suite.cases {
        let mut testcase = BytesStart::new("testcase");
        testcase.push_attribute(("classname", case.classname.as_str()));
        testcase.push_attribute(("name", case.name.as_str()));
        let time = format!("{:.3}", case.elapsed.unwrap_or(0.0));
        testcase.push_attribute(("time", time.as_str()));

        let detail = match case.status {
            CaseStatus::Pass => None,
            CaseStatus::Fail => {
                let mut failure = BytesStart::new("failure");
                failure.push_attribute(("message", case.message.as_str()));
                failure.push_attribute(("type", "AssertionError"));
                Some(failure)
            }
            CaseStatus::Skip => {
                let mut skip = BytesStart::new("skipped");
                skip.push_attribute(("message", case.message.as_str()));
                Some(skip)
            }
        };

        match detail {
            None => write(writer, Event::Empty(testcase))?,
            Some(detail) => {
                write(writer, Event::Start(testcase))?;
                write(writer, Event::Empty(detail))?;
                write(writer, Event::End(BytesEnd::new("testcase")))?;
            }
        }
    }

    write(writer, Event::End(BytesEnd::new("testsuite")))
}

fn push_counts(elem: &mut BytesStart<'_>, tests: usize, failures: usize, skipped: usize) {
    elem.push_attribute(("tests", tests.to_string().as_str()));
    elem.push_attribute(("errors", "0"));
    elem.push_attribute(("failures", failures.to_string().as_str()));
    elem.push_attribute(("skipped", skipped.to_string().as_str()));
}

fn write<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Report(format!("failed to write xUnit report: {}", e)))
}
