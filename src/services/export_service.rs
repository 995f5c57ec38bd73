use crate::error::Result;
use crate::models::result::ResultRow;
use rust_xlsxwriter::*;

pub struct ExportService;

impl ExportService {
    fn escape_html(input: &str) -> String {
        input
            .replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    /// Renders the results as an HTML table. Served with an
    /// `application/msword` content type this opens directly in Word, which is
    /// how the portal has always delivered its "Word" export.
    pub fn generate_results_doc(rows: &[ResultRow]) -> String {
        let mut body = String::new();
        for row in rows {
            let percentage = if row.total_questions > 0 {
                (row.score as f64 / row.total_questions as f64) * 100.0
            } else {
                0.0
            };
            let submitted = row
                .submitted_at
                .map(|d| d.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_default();
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}/{}</td><td>{:.1}%</td><td>{}</td></tr>\n",
                Self::escape_html(&row.reg_no),
                Self::escape_html(&row.student_name),
                Self::escape_html(&row.class),
                Self::escape_html(&row.subject),
                Self::escape_html(&row.test_title),
                row.score,
                row.total_questions,
                percentage,
                submitted,
            ));
        }

        let generated = chrono::Utc::now().format("%d/%m/%Y %H:%M UTC");
        format!(
            r#"<html>
<head><meta charset="utf-8"><title>Test Results</title></head>
<body>
<h2>D-Portal CBT &mdash; Test Results</h2>
<p>Generated: {generated} &bull; {count} result(s)</p>
<table border="1" cellpadding="4" cellspacing="0">
<tr><th>Reg No</th><th>Student</th><th>Class</th><th>Subject</th><th>Test</th><th>Score</th><th>Percentage</th><th>Submitted</th></tr>
{body}</table>
</body>
</html>
"#,
            generated = generated,
            count = rows.len(),
            body = body,
        )
    }

    /// Generate a styled XLSX workbook from the results listing.
    pub fn generate_results_xlsx(rows: &[ResultRow]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Results")?;

        let header_bg = Color::RGB(0x0F172A);
        let header_text = Color::White;
        let alt_row = Color::RGB(0xF8FAFC);
        let border_color = Color::RGB(0xE2E8F0);

        let pass_color = Color::RGB(0x10B981);
        let fail_color = Color::RGB(0xEF4444);

        let columns = [
            ("Reg No", 16.0),
            ("Student", 30.0),
            ("Class", 10.0),
            ("Subject", 22.0),
            ("Test", 32.0),
            ("Score", 10.0),
            ("Total", 10.0),
            ("Percentage", 14.0),
            ("Submitted", 20.0),
        ];

        for (i, (_, width)) in columns.iter().enumerate() {
            worksheet.set_column_width(i as u16, *width)?;
        }

        let title_format = Format::new()
            .set_font_size(14)
            .set_bold()
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::CenterAcross)
            .set_align(FormatAlign::VerticalCenter);

        worksheet.set_row_height(0, 32)?;
        let now = chrono::Utc::now().format("%d/%m/%Y %H:%M UTC").to_string();
        let title = format!("Test Results - exported {} - {} result(s)", now, rows.len());
        worksheet.merge_range(0, 0, 0, (columns.len() - 1) as u16, &title, &title_format)?;

        let header_format = Format::new()
            .set_bold()
            .set_font_size(10)
            .set_font_color(header_text)
            .set_background_color(header_bg)
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color);

        for (i, (name, _)) in columns.iter().enumerate() {
            worksheet.write_with_format(1, i as u16, *name, &header_format)?;
        }

        for (idx, row) in rows.iter().enumerate() {
            let row_num = (idx + 2) as u32;
            let mut cell_format = Format::new()
                .set_border(FormatBorder::Thin)
                .set_border_color(border_color);
            if idx % 2 == 0 {
                cell_format = cell_format.set_background_color(alt_row);
            }

            let percentage = if row.total_questions > 0 {
                (row.score as f64 / row.total_questions as f64) * 100.0
            } else {
                0.0
            };
            let pct_format = cell_format.clone().set_font_color(if percentage >= 50.0 {
                pass_color
            } else {
                fail_color
            });

            worksheet.write_with_format(row_num, 0, &row.reg_no, &cell_format)?;
            worksheet.write_with_format(row_num, 1, &row.student_name, &cell_format)?;
            worksheet.write_with_format(row_num, 2, &row.class, &cell_format)?;
            worksheet.write_with_format(row_num, 3, &row.subject, &cell_format)?;
            worksheet.write_with_format(row_num, 4, &row.test_title, &cell_format)?;
            worksheet.write_with_format(row_num, 5, row.score as f64, &cell_format)?;
            worksheet.write_with_format(row_num, 6, row.total_questions as f64, &cell_format)?;
            worksheet.write_with_format(row_num, 7, percentage / 100.0, &pct_format.set_num_format("0.0%"))?;
            let submitted = row
                .submitted_at
                .map(|d| d.format("%d/%m/%Y %H:%M").to_string())
                .unwrap_or_default();
            worksheet.write_with_format(row_num, 8, &submitted, &cell_format)?;
        }

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }
}
