//! Terminal report for a detection run

use crate::detect::{DetectionReport, RunReport};
use crate::error::OrphanError;
use std::io::{self, Write};
use std::path::Path;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn choice(color: bool) -> ColorChoice {
    if color {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

/// Print the location of a persisted index
pub fn print_index_location(dir: &Path, color: bool) -> io::Result<()> {
    let mut stdout = StandardStream::stdout(choice(color));
    stdout.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    write!(stdout, "Index file:")?;
    stdout.reset()?;
    writeln!(stdout, " {}", dir.display())
}

/// Print orphans and the summary to stdout, problems to stderr
pub fn print_run_report(report: &RunReport, stdout_color: bool, stderr_color: bool) -> io::Result<()> {
    let mut stderr = StandardStream::stderr(choice(stderr_color));
    write_problems(&mut stderr, "skipped", &report.skipped_documents)?;

    let mut stdout = StandardStream::stdout(choice(stdout_color));
    write_orphans(&mut stdout, &report.detection)?;

    write_problems(&mut stderr, "error", &report.detection.deletion_failures)?;

    write_summary(&mut stdout, &report.detection)?;
    if !report.skipped_documents.is_empty() {
        writeln!(
            stderr,
            "({} documents could not be read and were not indexed)",
            report.skipped_documents.len()
        )?;
    }
    Ok(())
}

/// One line per orphan, full candidate path
pub fn write_orphans<W: WriteColor>(out: &mut W, report: &DetectionReport) -> io::Result<()> {
    for orphan in &report.orphans {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
        write!(out, "{}", orphan.path.display())?;
        out.reset()?;
        writeln!(out)?;
    }
    Ok(())
}

/// `Found <k> orphans from <n>.`
pub fn write_summary<W: WriteColor>(out: &mut W, report: &DetectionReport) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(
        out,
        "Found {} orphans from {}.",
        report.orphan_count(),
        report.examined
    )?;
    out.reset()?;
    writeln!(out)?;

    if report.dry_run && report.orphan_count() > 0 {
        writeln!(out, "Dry run: nothing was deleted.")?;
    }
    Ok(())
}

/// `<label>: <message>` for each error, label in red
pub fn write_problems<W: WriteColor>(out: &mut W, label: &str, errors: &[OrphanError]) -> io::Result<()> {
    for err in errors {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
        write!(out, "{}:", label)?;
        out.reset()?;
        writeln!(out, " {}", err)?;
    }
    Ok(())
}
