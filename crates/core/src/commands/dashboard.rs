use futures_util::future::BoxFuture;
use serde_json::{json, Value};

use crate::app::App;
use crate::dashboard::{DashboardStats, TOP_N};
use crate::errors::Result;

pub fn stats(app: &App, _args: Value) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let prompts = app.prompts().get_all().await?;
        let stats = DashboardStats::from_prompts(&prompts);

        Ok(json!({
            "totalPrompts": stats.total_prompts,
            "categories": stats.category_counts.len(),
            "uniqueTags": stats.tag_counts.len(),
            // One decimal, as shown on the overview tile
            "averageTags": (stats.average_tags() * 10.0).round() / 10.0,
            "topCategories": stats.top_categories(TOP_N),
            "topTags": stats.top_tags(TOP_N),
            "stats": stats,
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::super::{dispatch, test_support};
    use serde_json::json;

    #[tokio::test]
    async fn test_stats() {
        let app = test_support::app();
        for tags in [json!(["a", "b"]), json!(["a"]), json!([])] {
            dispatch(&app, "prompts.create", json!({ "title": "t", "tags": tags }))
                .await
                .unwrap();
        }

        let result = dispatch(&app, "dashboard.stats", json!({})).await.unwrap();
        assert_eq!(result["totalPrompts"], json!(3));
        assert_eq!(result["categories"], json!(1));
        assert_eq!(result["uniqueTags"], json!(2));
        assert_eq!(result["averageTags"], json!(1.0));
        assert_eq!(result["topTags"][0]["name"], json!("a"));
        assert_eq!(
            result["topCategories"][0]["link"],
            json!("/prompts?category=General&showFilters=true")
        );
    }
}
