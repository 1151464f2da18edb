use futures_util::future::BoxFuture;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{parse_args, required_str};
use crate::app::App;
use crate::errors::Result;
use crate::filters::FilterSync;
use crate::prompt::PromptInput;

pub fn list(app: &App, _args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let prompts = app.prompts().get_all().await?;
        Ok(json!({ "prompts": prompts }))
    })
}

pub fn create(app: &App, args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let input: PromptInput = parse_args("prompts.create", args)?;
        let prompt = app.prompts().create(input).await?;
        Ok(json!(prompt))
    })
}

pub fn update(app: &App, args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let id = required_str("prompts.update", &args, "id")?;
        let input: PromptInput = parse_args("prompts.update", args)?;
        let prompt = app.prompts().update(&id, input).await?;
        Ok(json!(prompt))
    })
}

pub fn delete(app: &App, args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let id = required_str("prompts.delete", &args, "id")?;
        app.prompts().delete(&id).await?;
        Ok(json!({ "success": true }))
    })
}

#[derive(Debug, Default, Deserialize)]
struct SearchArgs {
    #[serde(default)]
    q: String,
}

pub fn search(app: &App, args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let args: SearchArgs = if args.is_null() {
            SearchArgs::default()
        } else {
            parse_args("prompts.search", args)?
        };
        let prompts = app.prompts().search(&args.q).await?;
        Ok(json!({ "prompts": prompts }))
    })
}

/// Filtered list for a page URL query, plus the normalized query to show
pub fn view(app: &App, args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let query = args.get("query").and_then(Value::as_str).unwrap_or_default();
        let sync = FilterSync::mount(query);
        let prompts = app.prompts().get_all().await?;
        let view = sync.state().view(&prompts);

        Ok(json!({
            "filters": sync.state(),
            "query": sync.query(),
            "emptyMessage": view.empty_message(),
            "view": view,
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::super::{dispatch, test_support};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_list() {
        let app = test_support::app();
        let created = dispatch(
            &app,
            "prompts.create",
            json!({ "title": "Explain", "content": "Explain this code", "category": "Code", "tags": "rust, review" }),
        )
        .await
        .unwrap();

        assert_eq!(created["category"], json!("Code"));
        assert_eq!(created["tags"], json!(["rust", "review"]));

        let listed = dispatch(&app, "prompts.list", json!({})).await.unwrap();
        assert_eq!(listed["prompts"][0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_create_missing_title_is_invalid_args() {
        let app = test_support::app();
        let err = dispatch(&app, "prompts.create", json!({ "content": "x" }))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "arguments");
    }

    #[tokio::test]
    async fn test_create_unknown_category_is_rejected() {
        let app = test_support::app();
        let err = dispatch(&app, "prompts.create", json!({ "title": "t", "category": "Poetry" }))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "arguments");
        assert!(err.to_string().contains("Poetry"));

        let listed = dispatch(&app, "prompts.list", json!({})).await.unwrap();
        assert!(listed["prompts"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let app = test_support::app();
        let created = dispatch(&app, "prompts.create", json!({ "title": "a" }))
            .await
            .unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = dispatch(
            &app,
            "prompts.update",
            json!({ "id": id, "title": "b", "content": "new" }),
        )
        .await
        .unwrap();
        assert_eq!(updated["title"], json!("b"));

        dispatch(&app, "prompts.delete", json!({ "id": id })).await.unwrap();
        let err = dispatch(&app, "prompts.delete", json!({ "id": id }))
            .await
            .unwrap_err();
        assert_eq!(err.category(), "not_found");
    }

    #[tokio::test]
    async fn test_view_applies_query() {
        let app = test_support::app();
        for (title, category, tags) in [
            ("one", "Code", json!(["rust"])),
            ("two", "Code", json!(["go"])),
            ("three", "Writing", json!(["rust"])),
        ] {
            dispatch(
                &app,
                "prompts.create",
                json!({ "title": title, "category": category, "tags": tags }),
            )
            .await
            .unwrap();
        }

        let result = dispatch(
            &app,
            "prompts.view",
            json!({ "query": "category=Code&tag=rust&showFilters=true" }),
        )
        .await
        .unwrap();

        assert_eq!(result["view"]["prompts"].as_array().unwrap().len(), 1);
        assert_eq!(result["view"]["prompts"][0]["title"], json!("one"));
        assert_eq!(result["view"]["availableTags"], json!(["go", "rust"]));
        assert_eq!(
            result["query"],
            json!("category=Code&tag=rust&showFilters=true&tags=rust")
        );
        assert_eq!(result["emptyMessage"], json!(null));
    }

    #[tokio::test]
    async fn test_search_without_args_returns_all() {
        let app = test_support::app();
        dispatch(&app, "prompts.create", json!({ "title": "a" })).await.unwrap();
        let result = dispatch(&app, "prompts.search", json!(null)).await.unwrap();
        assert_eq!(result["prompts"].as_array().unwrap().len(), 1);
    }
}
