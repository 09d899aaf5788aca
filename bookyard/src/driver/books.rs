// Bookyard
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Operations on books.

use crate::db;
use crate::driver::{not_found_as, Driver};
use crate::model::{Book, BookFields, BookId};
use bookyard_core::driver::DriverResult;

impl Driver {
    /// Creates a new book with `fields` and a fresh identifier.
    pub(crate) async fn create_book(self, fields: BookFields) -> DriverResult<Book> {
        let book = Book::new(BookId::new_random(), fields);
        db::create_book(&mut self.db.ex().await?, &book).await?;
        Ok(book)
    }

    /// Deletes the book `id` and all of its reservations.
    pub(crate) async fn delete_book(self, id: BookId) -> DriverResult<()> {
        db::delete_book(&mut self.db.ex().await?, id)
            .await
            .map_err(|e| not_found_as(e, format!("Book {} not found", id)))
    }

    /// Gets the book `id`.
    pub(crate) async fn get_book(self, id: BookId) -> DriverResult<Book> {
        db::get_book(&mut self.db.ex().await?, id)
            .await
            .map_err(|e| not_found_as(e, format!("Book {} not found", id)))
    }

    /// Gets all books.
    pub(crate) async fn list_books(self) -> DriverResult<Vec<Book>> {
        let books = db::list_books(&mut self.db.ex().await?).await?;
        Ok(books)
    }

    /// Replaces the contents of the existing book `id` with `fields`.
    pub(crate) async fn update_book(self, id: BookId, fields: BookFields) -> DriverResult<Book> {
        let book = Book::new(id, fields);
        db::update_book(&mut self.db.ex().await?, &book)
            .await
            .map_err(|e| not_found_as(e, format!("Book {} not found", id)))?;
        Ok(book)
    }
}
