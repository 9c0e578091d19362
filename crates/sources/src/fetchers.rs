//! Content fetchers run by background refresh tasks

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use led_ticker_core::{ContentFeed, ContentFetcher, ProviderContext, ProviderRefreshError};
use led_ticker_types::{ContentItem, ContentSourceConfig, OfTheDayCategory};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Returns the value it was configured with
pub struct StaticFetcher<T> {
    value: T,
}

impl<T> StaticFetcher<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<T: Clone + Send + Sync + 'static> ContentFetcher for StaticFetcher<T> {
    type Output = T;

    async fn fetch(&self) -> Result<T, ProviderRefreshError> {
        Ok(self.value.clone())
    }
}

/// Reads a JSON document kept up to date by an external collaborator
pub struct JsonFileFetcher<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFileFetcher<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned + Send + Sync + 'static> ContentFetcher for JsonFileFetcher<T> {
    type Output = T;

    async fn fetch(&self) -> Result<T, ProviderRefreshError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let value = serde_json::from_str(&text)?;
        debug!("Read {}", self.path.display());
        Ok(value)
    }
}

/// Spawn the background feed described by a provider's source config
pub fn feed_for<T>(
    name: &str,
    source: &ContentSourceConfig<T>,
    budget: Duration,
    ctx: &ProviderContext,
) -> Result<ContentFeed<T>>
where
    T: Clone + DeserializeOwned + Send + Sync + 'static,
{
    let runtime = ctx.runtime()?;
    let feed = match source {
        ContentSourceConfig::Static { value } => {
            ContentFeed::spawn(name, StaticFetcher::new(value.clone()), budget, &runtime)
        }
        ContentSourceConfig::JsonFile { path } => {
            ContentFeed::spawn(name, JsonFileFetcher::<T>::new(path.clone()), budget, &runtime)
        }
    };
    Ok(feed)
}

/// Today's item for one "of the day" category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryItem {
    pub category: String,
    pub item: ContentItem,
}

/// One entry of a category data file
#[derive(Debug, Deserialize)]
struct DayEntry {
    #[serde(default = "default_title")]
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn default_title() -> String {
    "No Title".to_string()
}

/// Loads today's item from each enabled category's data file.
///
/// Data files map the day of the year (`"1"`..`"366"`) to an entry.
/// Unreadable files and days without an entry drop that category only.
pub struct OfTheDayFetcher {
    categories: Vec<OfTheDayCategory>,
    data_dir: Option<PathBuf>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl OfTheDayFetcher {
    pub fn new(categories: Vec<OfTheDayCategory>, data_dir: Option<PathBuf>) -> Self {
        Self {
            categories,
            data_dir,
            today: local_today,
        }
    }

    pub fn with_today(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        match &self.data_dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.to_path_buf(),
        }
    }

    async fn load_category(
        &self,
        category: &OfTheDayCategory,
        date: NaiveDate,
    ) -> Result<Option<CategoryItem>, ProviderRefreshError> {
        let path = self.resolve(&category.data_file);
        let text = tokio::fs::read_to_string(&path).await?;
        let mut days: HashMap<String, DayEntry> = serde_json::from_str(&text)?;
        let day = date.ordinal();
        Ok(days.remove(&day.to_string()).map(|entry| {
            let key = format!("{}:{}:{}", category.name, date.year(), day);
            let mut item = ContentItem::new(key, entry.title);
            item.subtitle = entry.subtitle;
            item.description = entry.description;
            CategoryItem {
                category: category.name.clone(),
                item,
            }
        }))
    }
}

impl ContentFetcher for OfTheDayFetcher {
    type Output = Vec<CategoryItem>;

    async fn fetch(&self) -> Result<Vec<CategoryItem>, ProviderRefreshError> {
        let date = (self.today)();
        let mut items = Vec::new();
        for category in self.categories.iter().filter(|c| c.enabled) {
            match self.load_category(category, date).await {
                Ok(Some(item)) => items.push(item),
                Ok(None) => warn!("No {} item for day {}", category.name, date.ordinal()),
                Err(e) => warn!("Skipping category {}: {}", category.name, e),
            }
        }
        debug!("Loaded {} of-the-day items for {}", items.len(), date);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use led_ticker_types::Quote;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("led-ticker-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_json_file_fetcher_reads_and_reports_errors() {
        let path = temp_path("quotes.json");
        std::fs::write(&path, r#"[{"symbol": "AAPL", "price": 190.0}]"#).unwrap();
        let quotes = JsonFileFetcher::<Vec<Quote>>::new(&path).fetch().await.unwrap();
        assert_eq!(quotes[0].label(), "AAPL:190.00");

        std::fs::write(&path, "not json").unwrap();
        let err = JsonFileFetcher::<Vec<Quote>>::new(&path).fetch().await.unwrap_err();
        assert!(matches!(err, ProviderRefreshError::Parse(_)));

        std::fs::remove_file(&path).unwrap();
        let err = JsonFileFetcher::<Vec<Quote>>::new(&path).fetch().await.unwrap_err();
        assert!(matches!(err, ProviderRefreshError::Io(_)));
    }

    fn day_289() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[tokio::test]
    async fn test_of_the_day_fetcher_picks_todays_entries() {
        let dir = temp_path("otd");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("words.json"),
            r#"{"289": {"title": "Serendipity", "subtitle": "noun", "description": "Lucky find"}}"#,
        )
        .unwrap();
        std::fs::write(dir.join("facts.json"), r#"{"1": {"title": "New year"}}"#).unwrap();

        let categories = vec![
            OfTheDayCategory {
                name: "word".into(),
                data_file: "words.json".into(),
                enabled: true,
            },
            OfTheDayCategory {
                name: "fact".into(),
                data_file: "facts.json".into(),
                enabled: true,
            },
            OfTheDayCategory {
                name: "missing".into(),
                data_file: "missing.json".into(),
                enabled: true,
            },
        ];
        let fetcher = OfTheDayFetcher::new(categories, Some(dir.clone())).with_today(day_289);
        let items = fetcher.fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].category, "word");
        assert_eq!(items[0].item.key, "word:2026:289");
        assert_eq!(items[0].item.subtitle_text(), Some("noun"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
