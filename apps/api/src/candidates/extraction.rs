//! Resume text extraction by file extension.
//!
//! Never fails: unreadable files become a bracketed placeholder so the
//! candidate is still created and the recruiter sees why the text is missing.

use encoding_rs::WINDOWS_1251;
use tracing::warn;

pub fn extract_resume_text(filename: &str, bytes: &[u8]) -> String {
    let lower = filename.to_lowercase();
    let text = if lower.ends_with(".pdf") {
        extract_pdf(bytes)
    } else if lower.ends_with(".docx") {
        "[DOCX parsing is not available. Please upload the resume as PDF or TXT.]".to_string()
    } else if lower.ends_with(".txt") || lower.ends_with(".rtf") {
        decode_text(bytes)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };
    // PostgreSQL TEXT cannot hold NUL.
    text.replace('\0', "")
}

fn extract_pdf(bytes: &[u8]) -> String {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!("PDF extraction failed: {e}");
            format!("[PDF parsing error: {e}]")
        }
    }
}

/// UTF-8 first, then Windows-1251 (common for Russian resumes).
fn decode_text(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }
    match WINDOWS_1251.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text.into_owned(),
        None => "[Text file - encoding not supported]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_text_file() {
        let text = extract_resume_text("cv.TXT", "Иван Петров, Rust".as_bytes());
        assert_eq!(text, "Иван Петров, Rust");
    }

    #[test]
    fn test_cp1251_text_file() {
        // "Привет" in Windows-1251
        let bytes = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2];
        assert_eq!(extract_resume_text("resume.txt", &bytes), "Привет");
    }

    #[test]
    fn test_broken_pdf_becomes_placeholder() {
        let text = extract_resume_text("resume.pdf", b"definitely not a pdf");
        assert!(text.starts_with("[PDF parsing error"), "got {text}");
    }

    #[test]
    fn test_docx_placeholder() {
        let text = extract_resume_text("resume.docx", b"PK\x03\x04");
        assert!(text.contains("DOCX"));
    }

    #[test]
    fn test_unknown_extension_is_lossy_utf8() {
        let text = extract_resume_text("resume.md", b"# CV\n\xFFskills");
        assert!(text.starts_with("# CV"));
        assert!(text.contains("skills"));
    }

    #[test]
    fn test_nul_bytes_are_stripped() {
        let text = extract_resume_text("resume.txt", b"a\0b");
        assert_eq!(text, "ab");
    }
}
