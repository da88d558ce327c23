//! Course document parsing.
//!
//! Expected document layout:
//!
//! ```text
//! Course Title: <title>
//! Course Link: <url>
//! Course Instructor: <name>
//!
//! Lesson 0: Introduction
//! Lesson Link: <url>
//! <lesson body...>
//! Lesson 1: ...
//! ```
//!
//! Malformed headers are reported as warnings and parsing continues
//! best-effort; a document without lesson markers is chunked as one block.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::core::errors::ApiError;
use crate::models::{Course, CourseChunk, Lesson};

use super::chunker::split_fixed;

/// Result of parsing one course document.
#[derive(Debug)]
pub struct ParsedDocument {
    pub course: Course,
    pub chunks: Vec<CourseChunk>,
    pub warnings: Vec<String>,
}

pub struct DocumentProcessor {
    chunk_size: usize,
    chunk_overlap: usize,
    course_title: Regex,
    course_link: Regex,
    course_instructor: Regex,
    lesson_marker: Regex,
    lesson_link: Regex,
}

impl DocumentProcessor {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            course_title: Regex::new(r"(?i)^Course Title:\s*(.+)$").expect("valid regex"),
            course_link: Regex::new(r"(?i)^Course Link:\s*(.+)$").expect("valid regex"),
            course_instructor: Regex::new(r"(?i)^Course Instructor:\s*(.+)$")
                .expect("valid regex"),
            lesson_marker: Regex::new(r"(?i)^Lesson\s+(\d+):\s*(.+)$").expect("valid regex"),
            lesson_link: Regex::new(r"(?i)^Lesson Link:\s*(.+)$").expect("valid regex"),
        }
    }

    /// Parse a course document from disk. The file name is the fallback
    /// course title when the header is missing.
    pub fn process_file(&self, path: &Path) -> Result<ParsedDocument, ApiError> {
        let content = read_file(path)?;
        let fallback_title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        Ok(self.process_text(&content, &fallback_title))
    }

    /// Parse raw course text into a course, its chunks, and any parse
    /// warnings encountered along the way.
    pub fn process_text(&self, raw: &str, fallback_title: &str) -> ParsedDocument {
        let mut warnings = Vec::new();
        let lines: Vec<&str> = raw.trim().lines().collect();

        let mut title = fallback_title.to_string();
        match lines.first().map(|l| l.trim()) {
            Some(first) if !first.is_empty() => {
                if let Some(caps) = self.course_title.captures(first) {
                    title = caps[1].trim().to_string();
                } else {
                    title = first.to_string();
                    warnings
                        .push("missing 'Course Title:' header; using first line as title".into());
                }
            }
            _ => {
                warnings.push(format!(
                    "missing 'Course Title:' header; falling back to '{}'",
                    fallback_title
                ));
            }
        }

        let mut course_link = None;
        let mut instructor = None;
        for line in lines.iter().take(4).skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(caps) = self.course_link.captures(line) {
                course_link = Some(caps[1].trim().to_string());
                continue;
            }
            if let Some(caps) = self.course_instructor.captures(line) {
                instructor = Some(caps[1].trim().to_string());
            }
        }

        let mut course = Course {
            title,
            course_link,
            instructor,
            lessons: Vec::new(),
        };

        // Body starts after the metadata block, skipping one blank separator.
        let mut start_index = 3.min(lines.len());
        if lines.len() > 3 && lines[3].trim().is_empty() {
            start_index = 4;
        }

        let mut chunks: Vec<CourseChunk> = Vec::new();
        let mut chunk_counter = 0usize;
        let mut current: Option<(u32, String, Option<String>)> = None;
        let mut body: Vec<&str> = Vec::new();

        let mut i = start_index;
        while i < lines.len() {
            let line = lines[i];
            let marker = self.lesson_marker.captures(line.trim());

            match marker.and_then(|caps| {
                caps[1]
                    .parse::<u32>()
                    .ok()
                    .map(|number| (number, caps[2].trim().to_string()))
            }) {
                Some((number, lesson_title)) => {
                    if let Some(lesson) = current.take() {
                        self.flush_lesson(&mut course, &mut chunks, &mut chunk_counter, lesson, &body);
                    }
                    body.clear();

                    let mut link = None;
                    if let Some(next) = lines.get(i + 1) {
                        if let Some(caps) = self.lesson_link.captures(next.trim()) {
                            link = Some(caps[1].trim().to_string());
                            i += 1;
                        }
                    }
                    current = Some((number, lesson_title, link));
                }
                None => body.push(line),
            }

            i += 1;
        }

        if let Some(lesson) = current.take() {
            self.flush_lesson(&mut course, &mut chunks, &mut chunk_counter, lesson, &body);
        }

        // No lesson markers at all: chunk the whole body without lesson tags.
        if chunks.is_empty() {
            let remaining = lines
                .get(start_index..)
                .map(|rest| normalize_whitespace(&rest.join("\n")))
                .unwrap_or_default();
            if remaining.is_empty() {
                warnings.push("document contains no lesson content".into());
            } else {
                warnings.push("no lesson markers found; chunking document as one block".into());
                for piece in split_fixed(&remaining, self.chunk_size, self.chunk_overlap) {
                    chunks.push(CourseChunk {
                        content: piece,
                        course_title: course.title.clone(),
                        lesson_number: None,
                        chunk_index: chunk_counter,
                    });
                    chunk_counter += 1;
                }
            }
        }

        ParsedDocument {
            course,
            chunks,
            warnings,
        }
    }

    fn flush_lesson(
        &self,
        course: &mut Course,
        chunks: &mut Vec<CourseChunk>,
        chunk_counter: &mut usize,
        lesson: (u32, String, Option<String>),
        body: &[&str],
    ) {
        let text = normalize_whitespace(&body.join("\n"));
        if text.is_empty() {
            return;
        }

        let (number, title, link) = lesson;
        course.lessons.push(Lesson {
            number,
            title,
            link,
        });

        for (idx, piece) in split_fixed(&text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
        {
            // The first chunk carries lesson context into the embedding.
            let content = if idx == 0 {
                format!("Lesson {} content: {}", number, piece)
            } else {
                piece
            };
            chunks.push(CourseChunk {
                content,
                course_title: course.title.clone(),
                lesson_number: Some(number),
                chunk_index: *chunk_counter,
            });
            *chunk_counter += 1;
        }
    }
}

fn read_file(path: &Path) -> Result<String, ApiError> {
    let bytes = fs::read(path).map_err(ApiError::internal)?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    })
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Course Title: Building Towards Computer Use
Course Link: https://example.com/course
Course Instructor: Colt Steele

Lesson 0: Introduction
Lesson Link: https://example.com/lesson0
Welcome to the course. This lesson introduces the main ideas and sets
expectations for what follows.
Lesson 1: Getting Set Up
Install the tools and verify that everything runs before moving on.
";

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(800, 100)
    }

    #[test]
    fn parses_course_metadata() {
        let parsed = processor().process_text(SAMPLE, "fallback.txt");

        assert_eq!(parsed.course.title, "Building Towards Computer Use");
        assert_eq!(
            parsed.course.course_link.as_deref(),
            Some("https://example.com/course")
        );
        assert_eq!(parsed.course.instructor.as_deref(), Some("Colt Steele"));
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn parses_lessons_with_links() {
        let parsed = processor().process_text(SAMPLE, "fallback.txt");

        assert_eq!(parsed.course.lessons.len(), 2);
        assert_eq!(parsed.course.lessons[0].number, 0);
        assert_eq!(parsed.course.lessons[0].title, "Introduction");
        assert_eq!(
            parsed.course.lessons[0].link.as_deref(),
            Some("https://example.com/lesson0")
        );
        assert_eq!(parsed.course.lessons[1].number, 1);
        assert!(parsed.course.lessons[1].link.is_none());
    }

    #[test]
    fn short_lessons_produce_one_chunk_each() {
        let parsed = processor().process_text(SAMPLE, "fallback.txt");

        assert_eq!(parsed.chunks.len(), 2);
        assert_eq!(parsed.chunks[0].lesson_number, Some(0));
        assert_eq!(parsed.chunks[1].lesson_number, Some(1));
        // Document-wide chunk indices
        assert_eq!(parsed.chunks[0].chunk_index, 0);
        assert_eq!(parsed.chunks[1].chunk_index, 1);
    }

    #[test]
    fn first_chunk_of_lesson_carries_context_prefix() {
        let parsed = processor().process_text(SAMPLE, "fallback.txt");

        assert!(parsed.chunks[0].content.starts_with("Lesson 0 content: "));
        assert!(parsed.chunks[1].content.starts_with("Lesson 1 content: "));
        // The lesson link line is metadata, not body text
        assert!(!parsed.chunks[0].content.contains("Lesson Link"));
    }

    #[test]
    fn long_lesson_splits_with_document_wide_indices() {
        let body: String = "word ".repeat(400);
        let doc = format!(
            "Course Title: T\nCourse Link: x\nCourse Instructor: y\n\nLesson 0: A\n{}\nLesson 1: B\nshort body\n",
            body
        );
        let parsed = DocumentProcessor::new(200, 40).process_text(&doc, "f.txt");

        let lesson0: Vec<_> = parsed
            .chunks
            .iter()
            .filter(|c| c.lesson_number == Some(0))
            .collect();
        assert!(lesson0.len() > 1);
        // Only the first chunk of the lesson gets the prefix
        assert!(lesson0[0].content.starts_with("Lesson 0 content: "));
        assert!(!lesson0[1].content.starts_with("Lesson"));

        let indices: Vec<_> = parsed.chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, (0..parsed.chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn missing_title_header_warns_and_uses_first_line() {
        let doc = "Some Course\n\nLesson 0: Intro\nbody text here\n";
        let parsed = processor().process_text(doc, "fallback.txt");

        assert_eq!(parsed.course.title, "Some Course");
        assert!(parsed
            .warnings
            .iter()
            .any(|w| w.contains("Course Title")));
        assert_eq!(parsed.chunks.len(), 1);
    }

    #[test]
    fn document_without_markers_chunks_as_one_block() {
        let doc = "Course Title: T\nCourse Link: x\nCourse Instructor: y\n\njust prose with no markers at all";
        let parsed = processor().process_text(doc, "f.txt");

        assert_eq!(parsed.chunks.len(), 1);
        assert!(parsed.chunks[0].lesson_number.is_none());
        assert!(parsed.warnings.iter().any(|w| w.contains("no lesson markers")));
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let parsed = processor().process_text("", "empty.txt");
        assert!(parsed.chunks.is_empty());
        assert!(!parsed.warnings.is_empty());
    }
}
