use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::ids::{CourseId, VideoId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("duplicate course id: {0}")]
    DuplicateCourse(CourseId),

    #[error("duplicate video id {video} in course {course}")]
    DuplicateVideo { course: CourseId, video: VideoId },
}

//
// ─── CATALOG TYPES ─────────────────────────────────────────────────────────────
//

/// Course difficulty tier, as labelled in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A single video within a chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    id: VideoId,
    title: String,
}

impl Video {
    #[must_use]
    pub fn new(id: VideoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &VideoId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }
}

/// An ordered group of videos within a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    title: String,
    videos: Vec<Video>,
}

impl Chapter {
    #[must_use]
    pub fn new(title: impl Into<String>, videos: Vec<Video>) -> Self {
        Self {
            title: title.into(),
            videos,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn videos(&self) -> &[Video] {
        &self.videos
    }
}

/// A catalog course: static, externally supplied, read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    id: CourseId,
    title: String,
    instructor: String,
    difficulty: Difficulty,
    chapters: Vec<Chapter>,
}

impl Course {
    /// Creates a catalog course.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::EmptyTitle` if the title is empty or
    /// whitespace-only.
    pub fn new(
        id: CourseId,
        title: impl Into<String>,
        instructor: impl Into<String>,
        difficulty: Difficulty,
        chapters: Vec<Chapter>,
    ) -> Result<Self, CatalogError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CatalogError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            instructor: instructor.into(),
            difficulty,
            chapters,
        })
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn instructor(&self) -> &str {
        &self.instructor
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    /// Total number of videos across all chapters.
    #[must_use]
    pub fn total_videos(&self) -> usize {
        self.chapters.iter().map(|c| c.videos.len()).sum()
    }

    /// Whether `video` belongs to this course.
    #[must_use]
    pub fn contains_video(&self, video: &VideoId) -> bool {
        self.chapters
            .iter()
            .any(|c| c.videos.iter().any(|v| &v.id == video))
    }

    /// Iterates over every video id in chapter order.
    pub fn video_ids(&self) -> impl Iterator<Item = &VideoId> {
        self.chapters
            .iter()
            .flat_map(|c| c.videos.iter().map(Video::id))
    }
}

//
// ─── COURSE CATALOG ────────────────────────────────────────────────────────────
//

/// Read-only collection of courses with O(1) lookup by id.
///
/// The catalog is the authority on which video ids are valid completion
/// targets; stores consult it before accepting a completion fact.
#[derive(Debug, Clone)]
pub struct CourseCatalog {
    courses: Vec<Course>,
    by_id: HashMap<CourseId, usize>,
}

impl CourseCatalog {
    /// Builds a catalog from a list of courses.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateCourse` if two courses share an id, or
    /// `CatalogError::DuplicateVideo` if a video id appears twice within a
    /// course.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::with_capacity(courses.len());
        for (index, course) in courses.iter().enumerate() {
            if by_id.insert(course.id.clone(), index).is_some() {
                return Err(CatalogError::DuplicateCourse(course.id.clone()));
            }

            let mut seen = std::collections::HashSet::new();
            for video in course.video_ids() {
                if !seen.insert(video) {
                    return Err(CatalogError::DuplicateVideo {
                        course: course.id.clone(),
                        video: video.clone(),
                    });
                }
            }
        }

        Ok(Self { courses, by_id })
    }

    /// Looks up a course by id.
    #[must_use]
    pub fn course(&self, id: &CourseId) -> Option<&Course> {
        self.by_id.get(id).map(|&index| &self.courses[index])
    }

    /// All courses, in catalog order.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Small built-in catalog mirroring the demo course data, used by the
    /// seed binary and tests.
    ///
    /// # Panics
    ///
    /// Never panics: the sample data is statically well-formed.
    #[must_use]
    pub fn sample() -> Self {
        let rust = Course::new(
            CourseId::new("rust-foundations"),
            "Rust Foundations",
            "Mara Jensen",
            Difficulty::Beginner,
            vec![
                Chapter::new(
                    "Getting Started",
                    vec![
                        Video::new(VideoId::new("rf-1-1"), "Installing the toolchain"),
                        Video::new(VideoId::new("rf-1-2"), "Hello, Cargo"),
                    ],
                ),
                Chapter::new(
                    "Ownership",
                    vec![
                        Video::new(VideoId::new("rf-2-1"), "Moves and copies"),
                        Video::new(VideoId::new("rf-2-2"), "Borrowing"),
                    ],
                ),
            ],
        )
        .expect("sample course is valid");

        let sql = Course::new(
            CourseId::new("practical-sql"),
            "Practical SQL",
            "Diego Alvarez",
            Difficulty::Intermediate,
            vec![Chapter::new(
                "Queries",
                vec![
                    Video::new(VideoId::new("ps-1-1"), "SELECT basics"),
                    Video::new(VideoId::new("ps-1-2"), "Joins"),
                    Video::new(VideoId::new("ps-1-3"), "Aggregation"),
                ],
            )],
        )
        .expect("sample course is valid");

        Self::new(vec![rust, sql]).expect("sample catalog is valid")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
