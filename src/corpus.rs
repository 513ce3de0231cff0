//! Loading, caching and writing article corpora.
//!
//! A corpus file is either CSV (the layout the collector writes) or a JSON
//! array of the same records; the file extension decides which. When no
//! file can be loaded the drivers fall back to [`sample_corpus`], a seeded
//! synthetic corpus shaped like real collection output.

use crate::error::CorpusError;
use crate::models::Article;
use chrono::{FixedOffset, NaiveDate, TimeZone};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, info, instrument, warn};

/// Default corpus location, matching the collector's default output.
pub const DEFAULT_CORPUS_PATH: &str = "data/naver_news.csv";

/// Seed for the synthetic sample corpus.
pub const SAMPLE_SEED: u64 = 42;

/// Words the synthetic sample corpus draws from.
pub const SAMPLE_KEYWORDS: [&str; 12] = [
    "노래", "케이팝", "한국", "넷플릭스", "인기", "응원", "최고", "문화", "주말", "아이돌", "케데헌", "케데헌 효과",
];

/// Where a corpus came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum CorpusSource {
    File(PathBuf),
    Sample,
}

impl std::fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusSource::File(path) => write!(f, "{}", path.display()),
            CorpusSource::Sample => write!(f, "synthetic sample"),
        }
    }
}

/// An ordered, immutable collection of articles.
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    pub articles: Vec<Article>,
    pub source: CorpusSource,
}

impl Corpus {
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn is_sample(&self) -> bool {
        self.source == CorpusSource::Sample
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Csv,
    Json,
}

fn format_of(path: &Path) -> Result<Format, CorpusError> {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "csv" => Ok(Format::Csv),
        Some(ext) if ext == "json" => Ok(Format::Json),
        _ => Err(CorpusError::UnsupportedFormat(path.to_path_buf())),
    }
}

/// Read a corpus file.
///
/// # Arguments
///
/// * `path` - A `.csv` or `.json` file as written by [`write_corpus`]
///
/// # Errors
///
/// [`CorpusError::NotFound`] if the file is missing,
/// [`CorpusError::UnsupportedFormat`] for other extensions, and an I/O, CSV
/// or JSON error when the file cannot be read or parsed.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_corpus(path: &Path) -> Result<Corpus, CorpusError> {
    if !path.exists() {
        return Err(CorpusError::NotFound(path.to_path_buf()));
    }
    let format = format_of(path)?;
    let io_err = |source| CorpusError::Io {
        path: path.to_path_buf(),
        source,
    };

    let articles = match format {
        Format::Csv => {
            let mut reader = csv::Reader::from_path(path).map_err(|source| CorpusError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
            reader
                .deserialize::<Article>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| CorpusError::Csv {
                    path: path.to_path_buf(),
                    source,
                })?
        }
        Format::Json => {
            let file = File::open(path).map_err(io_err)?;
            serde_json::from_reader(std::io::BufReader::new(file)).map_err(|source| CorpusError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
    };

    info!(count = articles.len(), "Loaded corpus");
    Ok(Corpus {
        articles,
        source: CorpusSource::File(path.to_path_buf()),
    })
}

/// Flat CSV row; every column is always present so headers stay aligned.
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "pubDate")]
    pub_date: String,
    date: NaiveDate,
    title: &'a str,
    description: &'a str,
    originallink: &'a str,
    link: &'a str,
}

impl<'a> From<&'a Article> for CsvRow<'a> {
    fn from(article: &'a Article) -> Self {
        Self {
            pub_date: article.pub_date.to_rfc3339(),
            date: article.date,
            title: &article.title,
            description: &article.description,
            originallink: article.original_link.as_deref().unwrap_or_default(),
            link: article.link.as_deref().unwrap_or_default(),
        }
    }
}

/// Write articles to a corpus file, CSV or JSON by extension.
///
/// # Errors
///
/// Returns [`CorpusError::UnsupportedFormat`] for an unknown extension, or
/// the underlying I/O or serialization error.
#[instrument(level = "info", skip(articles), fields(path = %path.display(), count = articles.len()))]
pub fn write_corpus(path: &Path, articles: &[Article]) -> Result<(), CorpusError> {
    let format = format_of(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| CorpusError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match format {
        Format::Csv => {
            let csv_err = |source| CorpusError::Csv {
                path: path.to_path_buf(),
                source,
            };
            let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
            for article in articles {
                writer.serialize(CsvRow::from(article)).map_err(csv_err)?;
            }
            writer.flush().map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
        Format::Json => {
            let json = serde_json::to_string_pretty(articles).map_err(|source| CorpusError::Json {
                path: path.to_path_buf(),
                source,
            })?;
            std::fs::write(path, json).map_err(|source| CorpusError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    info!("Wrote corpus");
    Ok(())
}

/// Deterministic synthetic corpus for 2025-06-15 through 2025-09-20.
///
/// Each day draws a raw volume in `50..300` and emits a tenth of it as
/// articles whose title and description are built from [`SAMPLE_KEYWORDS`].
pub fn sample_corpus() -> Corpus {
    let mut rng = StdRng::seed_from_u64(SAMPLE_SEED);
    let mut articles = Vec::new();

    let (Some(kst), Some(start), Some(end)) = (
        FixedOffset::east_opt(9 * 3600),
        NaiveDate::from_ymd_opt(2025, 6, 15),
        NaiveDate::from_ymd_opt(2025, 9, 20),
    ) else {
        return Corpus {
            articles,
            source: CorpusSource::Sample,
        };
    };

    let pick = |rng: &mut StdRng| SAMPLE_KEYWORDS[rng.random_range(0..SAMPLE_KEYWORDS.len())];
    for day in start.iter_days().take_while(|d| *d <= end) {
        let Some(midnight) = day.and_hms_opt(0, 0, 0).and_then(|t| kst.from_local_datetime(&t).single()) else {
            continue;
        };
        let volume: usize = rng.random_range(50..300);
        for _ in 0..volume / 10 {
            let title = format!("케이팝 데몬 헌터스 {} 화제", pick(&mut rng));
            let description = format!(
                "{} {} 케이팝 데몬 헌터스 {}",
                pick(&mut rng),
                pick(&mut rng),
                pick(&mut rng)
            );
            articles.push(Article::new(midnight, title, description));
        }
    }

    debug!(count = articles.len(), "Generated sample corpus");
    Corpus {
        articles,
        source: CorpusSource::Sample,
    }
}

/// Load a corpus file, or fall back to the sample corpus with a warning.
pub fn load_or_sample(path: &Path) -> Corpus {
    match load_corpus(path) {
        Ok(corpus) => corpus,
        Err(e) => {
            warn!(error = %e, "Could not load corpus; using the synthetic sample instead");
            sample_corpus()
        }
    }
}

/// File identity used as cache key: the corpus is reloaded whenever the
/// file is replaced, grows or is touched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    path: PathBuf,
    len: u64,
    modified: Option<SystemTime>,
}

impl CacheKey {
    fn for_path(path: &Path) -> Option<Self> {
        let path = path.canonicalize().ok()?;
        let meta = std::fs::metadata(&path).ok()?;
        Some(Self {
            path,
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Parsed corpora keyed by source file identity.
#[derive(Debug, Default)]
pub struct CorpusCache {
    entries: FxHashMap<CacheKey, Arc<Corpus>>,
    /// Generated once, on the first load failure.
    sample: Option<Arc<Corpus>>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached corpus for `path`, loading it on a miss.
    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<Corpus>, CorpusError> {
        let key = CacheKey::for_path(path).ok_or_else(|| CorpusError::NotFound(path.to_path_buf()))?;
        if let Some(corpus) = self.entries.get(&key) {
            debug!("Corpus cache hit");
            return Ok(Arc::clone(corpus));
        }

        // A changed file leaves a stale entry under its old identity
        self.entries.retain(|k, _| k.path != key.path);
        let corpus = Arc::new(load_corpus(path)?);
        self.entries.insert(key, Arc::clone(&corpus));
        Ok(corpus)
    }

    /// Like [`CorpusCache::get_or_load`], falling back to the sample corpus.
    ///
    /// The sample is built and warned about once; later misses reuse it
    /// until [`CorpusCache::clear`].
    pub fn get_or_sample(&mut self, path: &Path) -> Arc<Corpus> {
        let e = match self.get_or_load(path) {
            Ok(corpus) => return corpus,
            Err(e) => e,
        };
        if let Some(sample) = &self.sample {
            debug!(error = %e, "Corpus still unavailable; reusing the synthetic sample");
            return Arc::clone(sample);
        }
        warn!(error = %e, "Could not load corpus; using the synthetic sample instead");
        Arc::clone(self.sample.insert(Arc::new(sample_corpus())))
    }

    /// Drop any cached corpus for `path`. Returns whether one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let target = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let before = self.entries.len();
        self.entries.retain(|k, _| k.path != target);
        before != self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sample = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;
    use std::io::Write;

    const CSV: &str = "pubDate,date,title,description,originallink,link\n\
2025-06-20 10:00:00+09:00,2025-06-20,<b>케이팝</b> 데몬 헌터스,노래 한국,https://www.yna.co.kr/a,\n\
2025-06-21 08:30:00+09:00,2025-06-21,주말 흥행,\"한국, 문화\",,\n";

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv_corpus() {
        let file = csv_file(CSV);
        let corpus = load_corpus(file.path()).unwrap();

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.articles[0].date, NaiveDate::from_ymd_opt(2025, 6, 20).unwrap());
        assert_eq!(corpus.articles[0].original_link.as_deref(), Some("https://www.yna.co.kr/a"));
        assert_eq!(corpus.articles[0].link, None);
        assert_eq!(corpus.articles[1].description, "한국, 문화");
        assert!(!corpus.is_sample());
    }

    #[test]
    fn test_load_csv_without_link_columns() {
        let file = csv_file("pubDate,date,title,description\n2025-07-01,2025-07-01,제목,설명\n");
        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(corpus.articles[0].original_link, None);
        assert_eq!(corpus.articles[0].title, "제목");
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_corpus(Path::new("/nonexistent/naver_news.csv"));
        assert!(matches!(result, Err(CorpusError::NotFound(_))));
    }

    #[test]
    fn test_load_malformed_csv() {
        let file = csv_file("pubDate,date,title,description\nnot a date,2025-07-01,제목,설명\n");
        assert!(matches!(load_corpus(file.path()), Err(CorpusError::Csv { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        assert!(matches!(
            load_corpus(file.path()),
            Err(CorpusError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_write_then_load_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut article = Article::new(parse_timestamp("2025-06-20 10:00:00+09:00").unwrap(), "제목", "설명, 쉼표");
        article.link = Some("https://n.news.naver.com/x".to_string());
        let articles = vec![article];

        for name in ["out/corpus.csv", "corpus.json"] {
            let path = dir.path().join(name);
            write_corpus(&path, &articles).unwrap();
            let loaded = load_corpus(&path).unwrap();
            assert_eq!(loaded.articles, articles, "{name}");
        }
    }

    #[test]
    fn test_load_or_sample_falls_back() {
        let corpus = load_or_sample(Path::new("/nonexistent/naver_news.csv"));
        assert!(corpus.is_sample());
        assert!(!corpus.is_empty());
    }

    #[test]
    fn test_sample_corpus_is_deterministic() {
        let a = sample_corpus();
        let b = sample_corpus();
        assert_eq!(a, b);

        let first = a.articles.first().unwrap();
        let last = a.articles.last().unwrap();
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(last.date, NaiveDate::from_ymd_opt(2025, 9, 20).unwrap());
        assert!(first.title.starts_with("케이팝 데몬 헌터스 "));
        assert!(first.description.contains("케이팝 데몬 헌터스"));

        // 98 days, 5..=29 articles each
        assert!(a.len() >= 98 * 5 && a.len() <= 98 * 29);
    }

    #[test]
    fn test_cache_hits_and_invalidation() {
        let file = csv_file(CSV);
        let mut cache = CorpusCache::new();

        let first = cache.get_or_load(file.path()).unwrap();
        let second = cache.get_or_load(file.path()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        assert!(cache.invalidate(file.path()));
        assert!(cache.is_empty());
        let third = cache.get_or_load(file.path()).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_reloads_changed_file() {
        let mut file = csv_file(CSV);
        let mut cache = CorpusCache::new();
        assert_eq!(cache.get_or_load(file.path()).unwrap().len(), 2);

        file.write_all("2025-06-22,2025-06-22,추가,기사,,\n".as_bytes()).unwrap();
        file.flush().unwrap();
        assert_eq!(cache.get_or_load(file.path()).unwrap().len(), 3);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_sample_fallback() {
        let mut cache = CorpusCache::new();
        let corpus = cache.get_or_sample(Path::new("/nonexistent/corpus.csv"));
        assert!(corpus.is_sample());
        assert!(cache.is_empty());

        // Repeated misses share one generated sample
        let again = cache.get_or_sample(Path::new("/nonexistent/corpus.csv"));
        assert!(Arc::ptr_eq(&corpus, &again));

        cache.clear();
        let fresh = cache.get_or_sample(Path::new("/nonexistent/corpus.csv"));
        assert!(!Arc::ptr_eq(&corpus, &fresh));
        assert_eq!(corpus.len(), fresh.len());
    }

    #[test]
    fn test_cache_prefers_file_once_it_appears() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("naver_news.csv");
        let mut cache = CorpusCache::new();
        assert!(cache.get_or_sample(&path).is_sample());

        std::fs::write(&path, CSV).unwrap();
        let loaded = cache.get_or_sample(&path);
        assert!(!loaded.is_sample());
        assert_eq!(loaded.len(), 2);
    }
}
