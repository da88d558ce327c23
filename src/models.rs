//! Domain types shared across the ingestion and query paths.

use serde::{Deserialize, Serialize};

/// A complete course. The title doubles as the unique identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub title: String,
    pub course_link: Option<String>,
    pub instructor: Option<String>,
    pub lessons: Vec<Lesson>,
}

/// A lesson within a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub number: u32,
    pub title: String,
    pub link: Option<String>,
}

/// A text chunk cut from a lesson body, ready for vector storage.
///
/// Chunks are created once at ingestion time and never updated in place;
/// re-ingesting a course replaces them via their id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseChunk {
    pub content: String,
    pub course_title: String,
    pub lesson_number: Option<u32>,
    /// Position of this chunk within the whole document.
    pub chunk_index: usize,
}

impl CourseChunk {
    /// Stable identifier used for idempotent upserts.
    pub fn chunk_id(&self) -> String {
        format!("{}_{}", self.course_title.replace(' ', "_"), self.chunk_index)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

/// One conversational turn in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_id_is_stable() {
        let chunk = CourseChunk {
            content: "text".to_string(),
            course_title: "Intro to MCP".to_string(),
            lesson_number: Some(1),
            chunk_index: 7,
        };
        assert_eq!(chunk.chunk_id(), "Intro_to_MCP_7");
    }
}
