use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::{
        domain::{bookmark::bookmark_id, Bookmark, Question},
        dto::response::BookmarkToggle,
    },
    repositories::BookmarkRepository,
};

pub struct BookmarkService {
    bookmarks: Arc<dyn BookmarkRepository>,
}

impl BookmarkService {
    pub fn new(bookmarks: Arc<dyn BookmarkRepository>) -> Self {
        Self { bookmarks }
    }

    pub async fn list_bookmarks(&self, user_id: &str) -> AppResult<Vec<Bookmark>> {
        self.bookmarks.find_by_user(user_id).await
    }

    /// Bookmarks the question, or removes the bookmark when it already exists.
    pub async fn toggle_bookmark(
        &self,
        user_id: &str,
        question: Question,
    ) -> AppResult<BookmarkToggle> {
        let id = bookmark_id(user_id, &question.id);

        if self.bookmarks.find_by_id(&id).await?.is_some() {
            self.bookmarks.delete(&id).await?;
            return Ok(BookmarkToggle::Removed);
        }

        self.bookmarks.insert(Bookmark::new(user_id, question)).await?;
        Ok(BookmarkToggle::Added)
    }
}
