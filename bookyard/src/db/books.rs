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

//! Persistence of books.

use crate::model::{Author, Book, BookFields, BookId, Isbn, Title};
use bookyard_core::db::{ensure_one_row, postgres, sqlite, DbResult, Executor};
use futures::TryStreamExt;
use sqlx::Row;
use uuid::Uuid;

/// Builds a `Book` from the raw values stored in the database.
fn build_book(id: Uuid, title: String, author: String, isbn: Option<String>) -> DbResult<Book> {
    let isbn = isbn.map(Isbn::new).transpose()?;
    let fields = BookFields::new(Title::new(title)?, Author::new(author)?, isbn);
    Ok(Book::new(BookId::from(id), fields))
}

/// Stores a new `book`.
pub(crate) async fn create_book(ex: &mut Executor, book: &Book) -> DbResult<()> {
    let fields = book.fields();
    let isbn = fields.isbn().as_ref().map(Isbn::as_str);

    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "INSERT INTO books (id, title, author, isbn) VALUES ($1, $2, $3, $4)";
            sqlx::query(query_str)
                .bind(book.id().as_uuid())
                .bind(fields.title().as_str())
                .bind(fields.author().as_str())
                .bind(isbn)
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "INSERT INTO books (id, title, author, isbn) VALUES (?, ?, ?, ?)";
            sqlx::query(query_str)
                .bind(book.id().as_uuid())
                .bind(fields.title().as_str())
                .bind(fields.author().as_str())
                .bind(isbn)
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}

/// Gets the book identified by `id`.
pub(crate) async fn get_book(ex: &mut Executor, id: BookId) -> DbResult<Book> {
    match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "SELECT title, author, isbn FROM books WHERE id = $1";
            let row = sqlx::query(query_str)
                .bind(id.as_uuid())
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            let title: String = row.try_get("title").map_err(postgres::map_sqlx_error)?;
            let author: String = row.try_get("author").map_err(postgres::map_sqlx_error)?;
            let isbn: Option<String> = row.try_get("isbn").map_err(postgres::map_sqlx_error)?;
            build_book(*id.as_uuid(), title, author, isbn)
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "SELECT title, author, isbn FROM books WHERE id = ?";
            let row = sqlx::query(query_str)
                .bind(id.as_uuid())
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            let title: String = row.try_get("title").map_err(sqlite::map_sqlx_error)?;
            let author: String = row.try_get("author").map_err(sqlite::map_sqlx_error)?;
            let isbn: Option<String> = row.try_get("isbn").map_err(sqlite::map_sqlx_error)?;
            build_book(*id.as_uuid(), title, author, isbn)
        }
    }
}

/// Gets all books sorted by title.
pub(crate) async fn list_books(ex: &mut Executor) -> DbResult<Vec<Book>> {
    let mut books = vec![];

    // Both backends share the same query because it has no parameters.
    let query_str = "SELECT id, title, author, isbn FROM books ORDER BY title, id";
    match ex {
        Executor::Postgres(ref mut ex) => {
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(postgres::map_sqlx_error)? {
                let id: Uuid = row.try_get("id").map_err(postgres::map_sqlx_error)?;
                let title: String = row.try_get("title").map_err(postgres::map_sqlx_error)?;
                let author: String = row.try_get("author").map_err(postgres::map_sqlx_error)?;
                let isbn: Option<String> = row.try_get("isbn").map_err(postgres::map_sqlx_error)?;
                books.push(build_book(id, title, author, isbn)?);
            }
        }

        Executor::Sqlite(ref mut ex) => {
            let mut rows = sqlx::query(query_str).fetch(ex.conn());
            while let Some(row) = rows.try_next().await.map_err(sqlite::map_sqlx_error)? {
                let id: Uuid = row.try_get("id").map_err(sqlite::map_sqlx_error)?;
                let title: String = row.try_get("title").map_err(sqlite::map_sqlx_error)?;
                let author: String = row.try_get("author").map_err(sqlite::map_sqlx_error)?;
                let isbn: Option<String> = row.try_get("isbn").map_err(sqlite::map_sqlx_error)?;
                books.push(build_book(id, title, author, isbn)?);
            }
        }
    }

    Ok(books)
}

/// Replaces the contents of an existing `book`.
///
/// Fails with `DbError::NotFound` without writing anything if the book does not exist.
pub(crate) async fn update_book(ex: &mut Executor, book: &Book) -> DbResult<()> {
    let fields = book.fields();
    let isbn = fields.isbn().as_ref().map(Isbn::as_str);

    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "UPDATE books SET title = $1, author = $2, isbn = $3 WHERE id = $4";
            sqlx::query(query_str)
                .bind(fields.title().as_str())
                .bind(fields.author().as_str())
                .bind(isbn)
                .bind(book.id().as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "UPDATE books SET title = ?, author = ?, isbn = ? WHERE id = ?";
            sqlx::query(query_str)
                .bind(fields.title().as_str())
                .bind(fields.author().as_str())
                .bind(isbn)
                .bind(book.id().as_uuid())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}

/// Deletes the book identified by `id` and, via the schema, all of its reservations.
pub(crate) async fn delete_book(ex: &mut Executor, id: BookId) -> DbResult<()> {
    let rows_affected = match ex {
        Executor::Postgres(ref mut ex) => {
            let query_str = "DELETE FROM books WHERE id = $1";
            sqlx::query(query_str)
                .bind(id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?
                .rows_affected()
        }

        Executor::Sqlite(ref mut ex) => {
            let query_str = "DELETE FROM books WHERE id = ?";
            sqlx::query(query_str)
                .bind(id.as_uuid())
                .execute(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?
                .rows_affected()
        }
    };
    ensure_one_row(rows_affected)
}
