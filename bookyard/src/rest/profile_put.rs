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

//! API to replace the contents of a profile.

use crate::driver::Driver;
use crate::model::{ProfileFields, ProfileId};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use bookyard_core::rest::{JsonBody, PathParam, RestError};

pub(crate) async fn handler(
    State(driver): State<Driver>,
    PathParam(id): PathParam<ProfileId>,
    JsonBody(fields): JsonBody<ProfileFields>,
) -> Result<impl IntoResponse, RestError> {
    let profile = driver.update_profile(id, fields).await?;
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use crate::model::*;
    use crate::rest::testutils::*;
    use axum::http;
    use bookyard_core::rest::testutils::*;
    use serde_json::json;

    fn route(id: ProfileId) -> (http::Method, String) {
        (http::Method::PUT, format!("/api/profiles/{}", id))
    }

    #[tokio::test]
    async fn test_ok() {
        let context = TestContext::setup().await;

        let profile = context.put_profile("Ana", "ana@example.com").await;

        let response = OneShotBuilder::new(context.app(), route(*profile.id()))
            .send_json(json!({"name": "Ana Smith", "email": "ana.smith@example.com"}))
            .await
            .expect_json::<Profile>()
            .await;
        let exp_profile = Profile::new(
            *profile.id(),
            ProfileFields::new(
                PersonName::from("Ana Smith"),
                EmailAddress::from("ana.smith@example.com"),
            ),
        );
        assert_eq!(exp_profile, response);

        assert_eq!(Some(exp_profile), context.get_profile(*profile.id()).await);
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let context = TestContext::setup().await;

        context.put_profile("Ana", "ana@example.com").await;
        let bob = context.put_profile("Bob", "bob@example.com").await;

        OneShotBuilder::new(context.app(), route(*bob.id()))
            .send_json(json!({"name": "Bob", "email": "ana@example.com"}))
            .await
            .expect_status(http::StatusCode::BAD_REQUEST)
            .expect_error("already in use")
            .await;

        assert_eq!(Some(bob.clone()), context.get_profile(*bob.id()).await);
    }

    #[tokio::test]
    async fn test_not_found() {
        let context = TestContext::setup().await;

        let id = ProfileId::new_random();
        OneShotBuilder::new(context.app(), route(id))
            .send_json(json!({"name": "Ghost", "email": "ghost@example.com"}))
            .await
            .expect_status(http::StatusCode::NOT_FOUND)
            .expect_error(&format!("Profile {} not found", id))
            .await;

        assert_eq!(None, context.get_profile(id).await);
    }

    test_payload_must_be_json!(
        TestContext::setup().await.into_app(),
        route(ProfileId::new_random())
    );
}
