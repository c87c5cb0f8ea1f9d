//! Labeled document-image datasets.
//!
//! Two sources: the Hugging Face datasets-server rows API (the default SROIE
//! test split) and a local directory with a `manifest.jsonl`.

use std::future::Future;
use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BenchError, Result};

/// Rows per datasets-server page (the API caps `length` at 100).
const HUB_PAGE_SIZE: usize = 100;

pub const MANIFEST_FILE: &str = "manifest.jsonl";

/// One labeled document image.
#[derive(Debug, Clone)]
pub struct Sample {
    pub image: DynamicImage,
    pub ground_truth_lines: Vec<String>,
}

impl Sample {
    pub fn new(image: DynamicImage, ground_truth_lines: Vec<String>) -> Self {
        Self {
            image,
            ground_truth_lines,
        }
    }

    /// Ground-truth lines joined by line breaks.
    pub fn ground_truth_text(&self) -> String {
        self.ground_truth_lines.join("\n")
    }
}

/// Source of ordered samples.
#[async_trait::async_trait]
pub trait DatasetProvider: Send + Sync {
    fn name(&self) -> String;

    /// Load the first `limit` samples in dataset order (fewer if the dataset is smaller).
    async fn load(&self, limit: usize) -> Result<Vec<Sample>>;
}

// ── Hub (datasets-server) ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RowsResponse {
    rows: Vec<RowEntry>,
    #[serde(default)]
    num_rows_total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct RowEntry {
    row_idx: usize,
    row: SroieRow,
}

#[derive(Debug, Deserialize)]
struct SroieRow {
    image: ImageCell,
    objects: ObjectsCell,
}

#[derive(Debug, Deserialize)]
struct ImageCell {
    src: String,
}

#[derive(Debug, Deserialize)]
struct ObjectsCell {
    text: Vec<String>,
}

/// Dataset read through the datasets-server rows endpoint.
pub struct HubDataset {
    base_url: String,
    dataset: String,
    config: String,
    split: String,
    client: reqwest::Client,
}

impl HubDataset {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        dataset: impl Into<String>,
        split: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            dataset: dataset.into(),
            config: "default".to_string(),
            split: split.into(),
            client,
        }
    }

    fn err(&self, message: impl ToString) -> BenchError {
        BenchError::dataset(self.name(), message)
    }

    async fn fetch_page(&self, offset: usize, length: usize) -> Result<RowsResponse> {
        let url = format!("{}/rows", self.base_url.trim_end_matches('/'));
        let offset = offset.to_string();
        let length = length.to_string();

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("dataset", self.dataset.as_str()),
                ("config", self.config.as_str()),
                ("split", self.split.as_str()),
                ("offset", offset.as_str()),
                ("length", length.as_str()),
            ])
            .send()
            .await
            .map_err(|e| self.err(e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(self.err(format!("rows API error ({}): {}", status, text)));
        }

        resp.json().await.map_err(|e| self.err(e))
    }

    async fn fetch_image(&self, row_idx: usize, src: &str) -> Result<DynamicImage> {
        let resp = self
            .client
            .get(src)
            .send()
            .await
            .map_err(|e| self.err(e))?;

        if !resp.status().is_success() {
            return Err(self.err(format!(
                "image download for row {} failed ({})",
                row_idx,
                resp.status()
            )));
        }

        let bytes = resp.bytes().await.map_err(|e| self.err(e))?;
        image::load_from_memory(&bytes)
            .map_err(|e| self.err(format!("row {}: cannot decode image: {}", row_idx, e)))
    }
}

#[async_trait::async_trait]
impl DatasetProvider for HubDataset {
    fn name(&self) -> String {
        format!("{} ({})", self.dataset, self.split)
    }

    async fn load(&self, limit: usize) -> Result<Vec<Sample>> {
        let rows = collect_rows(limit, |offset, length| self.fetch_page(offset, length)).await?;

        let mut samples = Vec::with_capacity(rows.len());
        for entry in rows {
            let image = self.fetch_image(entry.row_idx, &entry.row.image.src).await?;
            samples.push(Sample::new(image, entry.row.objects.text));
        }

        info!("Loaded {} samples from {}", samples.len(), self.name());
        Ok(samples)
    }
}

/// Page through the rows API until `limit` rows are collected, the reported
/// total is reached, or a page comes back empty. Offsets count rows already
/// collected.
async fn collect_rows<F, Fut>(limit: usize, mut fetch: F) -> Result<Vec<RowEntry>>
where
    F: FnMut(usize, usize) -> Fut,
    Fut: Future<Output = Result<RowsResponse>>,
{
    let mut rows = Vec::new();

    while rows.len() < limit {
        let offset = rows.len();
        let length = (limit - offset).min(HUB_PAGE_SIZE);
        let page = fetch(offset, length).await?;
        let page_len = page.rows.len();
        debug!(
            "HubDataset: fetched {} rows at offset {} (total {:?})",
            page_len, offset, page.num_rows_total
        );

        rows.extend(page.rows);

        let exhausted = page
            .num_rows_total
            .map(|total| rows.len() >= total)
            .unwrap_or(false);
        if page_len == 0 || exhausted {
            break;
        }
    }

    rows.truncate(limit);
    Ok(rows)
}

// ── Local manifest ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    image: PathBuf,
    text: Vec<String>,
}

/// Directory holding a `manifest.jsonl` and the images it references.
///
/// Each manifest line is `{"image": "<path relative to dir>", "text": ["line", ...]}`.
pub struct LocalDataset {
    dir: PathBuf,
}

impl LocalDataset {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn err(&self, message: impl ToString) -> BenchError {
        BenchError::dataset(self.name(), message)
    }

    fn read_entries(&self, limit: usize) -> Result<Vec<ManifestEntry>> {
        let path = self.dir.join(MANIFEST_FILE);
        let content = std::fs::read_to_string(&path)
            .map_err(|e| self.err(format!("cannot read {}: {}", path.display(), e)))?;

        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .take(limit)
            .map(|(n, line)| {
                serde_json::from_str(line)
                    .map_err(|e| self.err(format!("{} line {}: {}", MANIFEST_FILE, n + 1, e)))
            })
            .collect()
    }

    fn open_image(&self, rel: &Path) -> Result<DynamicImage> {
        let path = self.dir.join(rel);
        image::open(&path).map_err(|e| self.err(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait::async_trait]
impl DatasetProvider for LocalDataset {
    fn name(&self) -> String {
        self.dir.display().to_string()
    }

    async fn load(&self, limit: usize) -> Result<Vec<Sample>> {
        let entries = self.read_entries(limit)?;
        let samples = entries
            .into_iter()
            .map(|e| -> Result<Sample> { Ok(Sample::new(self.open_image(&e.image)?, e.text)) })
            .collect::<Result<Vec<_>>>()?;

        info!("Loaded {} samples from {}", samples.len(), self.name());
        Ok(samples)
    }
}

/// Write a local dataset (images as PNG plus manifest). Used to stage fixtures.
pub fn write_local_dataset(dir: &Path, samples: &[Sample]) -> anyhow::Result<()> {
    use anyhow::Context;
    use std::io::Write;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create dataset dir: {:?}", dir))?;
    let mut manifest = std::fs::File::create(dir.join(MANIFEST_FILE))
        .with_context(|| format!("Failed to create manifest in {:?}", dir))?;

    for (i, sample) in samples.iter().enumerate() {
        let name = format!("{:05}.png", i);
        sample
            .image
            .save(dir.join(&name))
            .with_context(|| format!("Failed to write {}", name))?;
        let line = serde_json::json!({ "image": name, "text": sample.ground_truth_lines });
        writeln!(manifest, "{}", line)?;
    }
    Ok(())
}
