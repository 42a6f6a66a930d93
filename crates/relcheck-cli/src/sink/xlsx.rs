//! Xlsx report sink.
//!
//! Renders the six sheets with the fixed column schemas. Domain-significant
//! header cells get a highlight fill, `F_Version.txt` rows render their git
//! hash and svn fields (indices 3 and 4) as emphasized rich text when they
//! differ, and the branch_error sheet is pre-filtered to `has_wave == N`
//! with the Y rows hidden on open.

use std::path::PathBuf;

use relcheck_core::diff::version::{f_version_fields, F_VERSION_HIGHLIGHT_FIELDS};
use relcheck_core::report::{
    EmitError, ReportSink, SHEET_BRANCH_ERROR, SHEET_CANNOT_COMPARE, SHEET_LOST_PROJECT,
    SHEET_REVISION_DIFF, SHEET_SUMMARY, SHEET_VERSION_DIFF,
};
use relcheck_core::SummaryReport;
use rust_xlsxwriter::{Color, FilterCondition, Format, Workbook, Worksheet, XlsxError};

const REVISION_DIFF_HEADERS: [&str; 17] = [
    "SN",
    "module",
    "location_path",
    "base_folder",
    "compare_folder",
    "name",
    "path",
    "base_short",
    "base_revision",
    "compare_short",
    "compare_revision",
    "base_upstream",
    "compare_upstream",
    "base_dest-branch",
    "compare_dest-branch",
    "base_link",
    "compare_link",
];

const BRANCH_ERROR_HEADERS: [&str; 14] = [
    "SN",
    "module",
    "location_path",
    "base_folder",
    "compare_folder",
    "name",
    "path",
    "revision_short",
    "revision",
    "upstream",
    "dest-branch",
    "compare_link",
    "problem",
    "has_wave",
];

const LOST_PROJECT_HEADERS: [&str; 12] = [
    "SN",
    "Base folder",
    "狀態",
    "module",
    "location_path",
    "folder",
    "name",
    "path",
    "upstream",
    "dest-branch",
    "revision",
    "link",
];

const VERSION_DIFF_HEADERS: [&str; 9] = [
    "SN",
    "module",
    "location_path",
    "base_folder",
    "compare_folder",
    "file_type",
    "base_content",
    "compare_content",
    "org_content",
];

const CANNOT_COMPARE_HEADERS: [&str; 7] = [
    "SN",
    "module",
    "location_path",
    "folder_count",
    "folders",
    "path",
    "reason",
];

const SUMMARY_HEADERS: [&str; 5] = [
    "scenario",
    "success_count",
    "failure_count",
    "success_modules",
    "failure_modules",
];

/// Writes the report as a styled workbook.
#[derive(Debug, Clone)]
pub struct XlsxSink {
    path: PathBuf,
}

/// Shared cell formats.
struct Styles {
    header: Format,
    header_highlight: Format,
    emphasis: Format,
    neutral: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0x00D9_E1F2)),
            header_highlight: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0x00FF_E699)),
            emphasis: Format::new().set_bold().set_font_color(Color::Red),
            neutral: Format::new(),
        }
    }
}

impl XlsxSink {
    /// Create a sink writing to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn render(&self, report: &SummaryReport) -> Result<Workbook, XlsxError> {
        let styles = Styles::new();
        let mut workbook = Workbook::new();

        write_summary(workbook.add_worksheet(), report, &styles)?;
        if !report.revision_diff.is_empty() {
            write_revision_diff(workbook.add_worksheet(), report, &styles)?;
        }
        if !report.branch_error.is_empty() {
            write_branch_error(workbook.add_worksheet(), report, &styles)?;
        }
        if !report.lost_project.is_empty() {
            write_lost_project(workbook.add_worksheet(), report, &styles)?;
        }
        if !report.version_diff.is_empty() {
            write_version_diff(workbook.add_worksheet(), report, &styles)?;
        }
        if !report.cannot_compare.is_empty() {
            write_cannot_compare(workbook.add_worksheet(), report, &styles)?;
        }
        Ok(workbook)
    }
}

impl ReportSink for XlsxSink {
    fn write(&mut self, report: &SummaryReport) -> Result<(), EmitError> {
        let mut workbook = self.render(report).map_err(render_error)?;
        workbook.save(&self.path).map_err(render_error)?;
        Ok(())
    }
}

fn render_error(e: XlsxError) -> EmitError {
    EmitError::Render {
        message: e.to_string(),
    }
}

fn write_headers(
    sheet: &mut Worksheet,
    headers: &[&str],
    highlighted: &[usize],
    styles: &Styles,
) -> Result<(), XlsxError> {
    for (col, header) in headers.iter().enumerate() {
        let format = if highlighted.contains(&col) {
            &styles.header_highlight
        } else {
            &styles.header
        };
        sheet.write_string_with_format(0, col as u16, *header, format)?;
    }
    Ok(())
}

fn write_summary(
    sheet: &mut Worksheet,
    report: &SummaryReport,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_SUMMARY)?;
    write_headers(sheet, &SUMMARY_HEADERS, &[], styles)?;
    for (i, row) in report.summary.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_string(r, 0, &row.scenario)?;
        sheet.write_number(r, 1, row.success_count as f64)?;
        sheet.write_number(r, 2, row.failure_count as f64)?;
        sheet.write_string(r, 3, &row.success_modules)?;
        sheet.write_string(r, 4, &row.failure_modules)?;
    }
    Ok(())
}

fn write_revision_diff(
    sheet: &mut Worksheet,
    report: &SummaryReport,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_REVISION_DIFF)?;
    // Revision columns carry the highlight per the report schema.
    write_headers(sheet, &REVISION_DIFF_HEADERS, &[7, 8, 9, 10], styles)?;
    for (i, row) in report.revision_diff.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, row.sn as f64)?;
        sheet.write_string(r, 1, &row.module)?;
        sheet.write_string(r, 2, &row.location_path)?;
        sheet.write_string(r, 3, &row.base_folder)?;
        sheet.write_string(r, 4, &row.compare_folder)?;
        sheet.write_string(r, 5, &row.name)?;
        sheet.write_string(r, 6, &row.path)?;
        sheet.write_string(r, 7, &row.base_short)?;
        sheet.write_string(r, 8, &row.base_revision)?;
        sheet.write_string(r, 9, &row.compare_short)?;
        sheet.write_string(r, 10, &row.compare_revision)?;
        sheet.write_string(r, 11, &row.base_upstream)?;
        sheet.write_string(r, 12, &row.compare_upstream)?;
        sheet.write_string(r, 13, &row.base_dest_branch)?;
        sheet.write_string(r, 14, &row.compare_dest_branch)?;
        sheet.write_string(r, 15, &row.base_link)?;
        sheet.write_string(r, 16, &row.compare_link)?;
    }
    Ok(())
}

fn write_branch_error(
    sheet: &mut Worksheet,
    report: &SummaryReport,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_BRANCH_ERROR)?;
    write_headers(sheet, &BRANCH_ERROR_HEADERS, &[12], styles)?;
    for (i, row) in report.branch_error.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, row.sn as f64)?;
        sheet.write_string(r, 1, &row.module)?;
        sheet.write_string(r, 2, &row.location_path)?;
        sheet.write_string(r, 3, &row.base_folder)?;
        sheet.write_string(r, 4, &row.compare_folder)?;
        sheet.write_string(r, 5, &row.name)?;
        sheet.write_string(r, 6, &row.path)?;
        sheet.write_string(r, 7, &row.revision_short)?;
        sheet.write_string(r, 8, &row.revision)?;
        sheet.write_string(r, 9, &row.upstream)?;
        sheet.write_string(r, 10, &row.dest_branch)?;
        sheet.write_string(r, 11, &row.compare_link)?;
        sheet.write_string(r, 12, &row.problem)?;
        sheet.write_string(r, 13, row.has_wave_label())?;
        // Y rows start hidden; the autofilter below keeps N rows visible.
        if row.has_wave {
            sheet.set_row_hidden(r)?;
        }
    }
    let last_row = report.branch_error.len() as u32;
    sheet.autofilter(0, 0, last_row, (BRANCH_ERROR_HEADERS.len() - 1) as u16)?;
    sheet.filter_column(13, &FilterCondition::new().add_list_filter("N"))?;
    Ok(())
}

fn write_lost_project(
    sheet: &mut Worksheet,
    report: &SummaryReport,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_LOST_PROJECT)?;
    write_headers(sheet, &LOST_PROJECT_HEADERS, &[1, 2], styles)?;
    for (i, row) in report.lost_project.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, row.sn as f64)?;
        sheet.write_string(r, 1, &row.stage_label)?;
        sheet.write_string(r, 2, &row.state)?;
        sheet.write_string(r, 3, &row.module)?;
        sheet.write_string(r, 4, &row.location_path)?;
        sheet.write_string(r, 5, &row.folder)?;
        sheet.write_string(r, 6, &row.name)?;
        sheet.write_string(r, 7, &row.path)?;
        sheet.write_string(r, 8, &row.upstream)?;
        sheet.write_string(r, 9, &row.dest_branch)?;
        sheet.write_string(r, 10, &row.revision)?;
        sheet.write_string(r, 11, &row.link)?;
    }
    Ok(())
}

fn write_version_diff(
    sheet: &mut Worksheet,
    report: &SummaryReport,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_VERSION_DIFF)?;
    write_headers(sheet, &VERSION_DIFF_HEADERS, &[6, 7], styles)?;
    for (i, row) in report.version_diff.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, row.sn as f64)?;
        sheet.write_string(r, 1, &row.module)?;
        sheet.write_string(r, 2, &row.location_path)?;
        sheet.write_string(r, 3, &row.base_folder)?;
        sheet.write_string(r, 4, &row.compare_folder)?;
        sheet.write_string(r, 5, &row.file_type)?;
        write_content_cell(sheet, r, 6, &row.base_content, &row.compare_content, row, styles)?;
        write_content_cell(sheet, r, 7, &row.compare_content, &row.base_content, row, styles)?;
        sheet.write_string(r, 8, &row.org_content)?;
    }
    Ok(())
}

/// Write a version_diff content cell, emphasizing the hash/svn fields of
/// `F_Version.txt` lines when they differ from the other side.
fn write_content_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    content: &str,
    other: &str,
    sheet_row: &relcheck_core::report::VersionDiffSheetRow,
    styles: &Styles,
) -> Result<(), XlsxError> {
    let is_f_version = sheet_row
        .file_type
        .eq_ignore_ascii_case(relcheck_core::config::F_VERSION_FILE);
    if !is_f_version || !content.contains(';') {
        return sheet.write_string(row, col, content).map(|_| ());
    }

    let fields = f_version_fields(content);
    let other_fields = f_version_fields(other);
    let mut segments: Vec<(&Format, String)> = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        let mut text = String::new();
        if i > 0 {
            text.push(';');
        }
        text.push_str(field);
        let differs = F_VERSION_HIGHLIGHT_FIELDS.contains(&i)
            && other_fields.get(i).map(|o| o != field).unwrap_or(true);
        let format = if differs {
            &styles.emphasis
        } else {
            &styles.neutral
        };
        segments.push((format, text));
    }
    let parts: Vec<(&Format, &str)> = segments
        .iter()
        .filter(|(_, text)| !text.is_empty())
        .map(|(format, text)| (*format, text.as_str()))
        .collect();
    if parts.len() < 2 {
        return sheet.write_string(row, col, content).map(|_| ());
    }
    sheet.write_rich_string(row, col, &parts).map(|_| ())
}

fn write_cannot_compare(
    sheet: &mut Worksheet,
    report: &SummaryReport,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.set_name(SHEET_CANNOT_COMPARE)?;
    write_headers(sheet, &CANNOT_COMPARE_HEADERS, &[], styles)?;
    for (i, row) in report.cannot_compare.iter().enumerate() {
        let r = (i + 1) as u32;
        sheet.write_number(r, 0, row.sn as f64)?;
        sheet.write_string(r, 1, &row.module)?;
        sheet.write_string(r, 2, &row.location_path)?;
        sheet.write_number(r, 3, row.folder_count as f64)?;
        sheet.write_string(r, 4, &row.folders)?;
        sheet.write_string(r, 5, &row.path)?;
        sheet.write_string(r, 6, &row.reason)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use relcheck_core::report::{BranchErrorRow, SummaryRow, VersionDiffSheetRow};

    fn sample_report() -> SummaryReport {
        SummaryReport {
            summary: vec![SummaryRow {
                scenario: "master_vs_premp".to_string(),
                success_count: 1,
                failure_count: 0,
                success_modules: "mac7p".to_string(),
                failure_modules: String::new(),
            }],
            branch_error: vec![BranchErrorRow {
                sn: 1,
                module: "mac7p".to_string(),
                location_path: "mac7p".to_string(),
                base_folder: "DB1".to_string(),
                compare_folder: "DB1-premp".to_string(),
                name: "q".to_string(),
                path: "p".to_string(),
                revision_short: "abc".to_string(),
                revision: "abc".to_string(),
                upstream: "realtek/android-14/master".to_string(),
                dest_branch: "realtek/android-14/master".to_string(),
                compare_link: String::new(),
                problem: "沒改成 premp".to_string(),
                has_wave: false,
            }],
            version_diff: vec![VersionDiffSheetRow {
                sn: 1,
                module: "mac7p".to_string(),
                location_path: "mac7p".to_string(),
                base_folder: "DB1".to_string(),
                compare_folder: "DB1-premp".to_string(),
                file_type: "F_Version.txt".to_string(),
                base_content: "P_GIT_001;k;b;h1;1".to_string(),
                compare_content: "P_GIT_001;k;b;h2;2".to_string(),
                org_content: "P_GIT_001;k;b;h1;1".to_string(),
            }],
            ..SummaryReport::default()
        }
    }

    #[test]
    fn test_workbook_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let mut sink = XlsxSink::new(&path);
        sink.write(&sample_report()).unwrap();
        assert!(path.metadata().unwrap().len() > 0);
    }

    #[test]
    fn test_empty_report_writes_summary_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        let mut sink = XlsxSink::new(&path);
        sink.write(&SummaryReport::default()).unwrap();
        assert!(path.exists());
    }
}
