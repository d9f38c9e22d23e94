use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use pokewiki_store::{ObjectStore, ObjectStoreExt};
use pokewiki_types::{keys, validate_page_name, PageFilter, PageRecord, SortDirection};

use crate::error::{PageError, PageResult};

/// Where pages and images are stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagesConfig {
    pub bucket: String,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            bucket: keys::DEFAULT_CONTENT_BUCKET.into(),
        }
    }
}

/// An image attached to a page upload. The bytes are stored unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    fn validate(&self) -> PageResult<()> {
        let name = self.filename.as_str();
        if name.is_empty()
            || name == "."
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
            || name.chars().any(char::is_control)
        {
            return Err(PageError::InvalidImageName(name.to_string()));
        }
        Ok(())
    }
}

/// Page and image access over an [`ObjectStore`].
pub struct PageStore {
    store: Arc<dyn ObjectStore>,
    config: PagesConfig,
}

impl PageStore {
    pub fn new(store: Arc<dyn ObjectStore>, config: PagesConfig) -> Self {
        Self { store, config }
    }

    fn bucket(&self) -> &str {
        &self.config.bucket
    }

    /// Store a new page, with its image if one is given.
    ///
    /// Returns `Ok(false)` without writing if a page with the same
    /// case-insensitive name exists. An image filename already stored by
    /// another page is an error, and nothing is written. The checks and the
    /// writes are separate store calls, so concurrent uploads of one name can
    /// both succeed.
    pub fn put_page(&self, mut record: PageRecord, image: Option<&ImageUpload>) -> PageResult<bool> {
        validate_page_name(&record.name)?;
        if let Some(image) = image {
            image.validate()?;
        }

        let key = record.key();
        if self.store.exists(self.bucket(), &key)? {
            debug!(page = %record.name, "upload rejected, page exists");
            return Ok(false);
        }

        if let Some(image) = image {
            let image_key = keys::image_key(&image.filename);
            if self.store.exists(self.bucket(), &image_key)? {
                debug!(page = %record.name, image = %image_key, "upload rejected, image exists");
                return Err(PageError::ImageExists(image_key));
            }
            self.store.put(
                self.bucket(),
                &image_key,
                &image.data,
                &image.content_type,
            )?;
            record.image_name = Some(image.filename.clone());
            record.image_type = Some(image.content_type.clone());
        }
        self.store.put_json(self.bucket(), &key, &record)?;

        info!(page = %record.name, key = %key, "page uploaded");
        Ok(true)
    }

    /// A single page by (case-insensitive) name.
    pub fn page(&self, name: &str) -> PageResult<Option<PageRecord>> {
        validate_page_name(name)?;
        Ok(self.store.get_json(self.bucket(), &keys::page_key(name))?)
    }

    /// Every page key, sorted. The namespace placeholder entry is excluded.
    pub fn list_pages(&self) -> PageResult<Vec<String>> {
        let keys = self.store.list(self.bucket(), keys::PAGES_PREFIX)?;
        Ok(keys
            .into_iter()
            .filter(|key| keys::page_name_from_key(key).is_some())
            .collect())
    }

    /// Keys of pages matching every set field of `filter`.
    pub fn find_pages(&self, filter: &PageFilter) -> PageResult<Vec<String>> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|(_, record)| filter.matches(record))
            .map(|(key, _)| key)
            .collect())
    }

    /// Keys of pages whose name contains `query`, ignoring case.
    pub fn search_pages(&self, query: &str) -> PageResult<Vec<String>> {
        self.find_pages(&PageFilter::by_name(query))
    }

    /// Page keys ordered by a numeric field.
    ///
    /// Equal values are ordered by key (reversed along with the values when
    /// descending). Pages where the field is missing or not numeric come
    /// last, in key order.
    pub fn sort_pages(&self, field: &str, direction: SortDirection) -> PageResult<Vec<String>> {
        let mut ranked = Vec::new();
        let mut unranked = Vec::new();
        for (key, record) in self.scan()? {
            match record.numeric_field(field) {
                Some(value) => ranked.push((value, key)),
                None => unranked.push(key),
            }
        }

        ranked.sort_by(|(a, a_key), (b, b_key)| {
            a.total_cmp(b).then_with(|| a_key.cmp(b_key))
        });
        if direction == SortDirection::Descending {
            ranked.reverse();
        }
        unranked.sort();

        Ok(ranked
            .into_iter()
            .map(|(_, key)| key)
            .chain(unranked)
            .collect())
    }

    /// Raw image bytes stored at `key`.
    pub fn image_bytes(&self, key: &str) -> PageResult<Option<Vec<u8>>> {
        Ok(self.store.get(self.bucket(), key)?)
    }

    /// Image at `key` as base64 text.
    pub fn image(&self, key: &str) -> PageResult<Option<String>> {
        Ok(self.store.get_base64(self.bucket(), key)?)
    }

    /// The image attached to a page, as base64 text.
    pub fn page_image(&self, record: &PageRecord) -> PageResult<Option<String>> {
        match &record.image_name {
            Some(filename) => self.image(&keys::image_key(filename)),
            None => Ok(None),
        }
    }

    /// Filter option metadata (`filtering/categories.json`), passed through
    /// as-is.
    pub fn categories(&self) -> PageResult<Option<Value>> {
        Ok(self.store.get_json(self.bucket(), keys::CATEGORIES_KEY)?)
    }

    /// Decode every page. Records that fail to decode are skipped so one bad
    /// upload cannot break listing; store failures still propagate.
    fn scan(&self) -> PageResult<Vec<(String, PageRecord)>> {
        let page_keys = self.list_pages()?;
        let values = self.store.get_batch(self.bucket(), &page_keys)?;

        let mut pages = Vec::with_capacity(page_keys.len());
        for (key, value) in page_keys.into_iter().zip(values) {
            let Some(bytes) = value else { continue };
            match pokewiki_store::codec::decode_json::<PageRecord>(&key, &bytes) {
                Ok(record) => pages.push((key, record)),
                Err(e) => warn!(key = %key, error = %e, "skipping undecodable page"),
            }
        }
        Ok(pages)
    }
}

impl std::fmt::Debug for PageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
