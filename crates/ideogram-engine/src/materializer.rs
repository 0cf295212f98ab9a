use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::thread;

use chrono::{SecondsFormat, Utc};
use ideogram_contracts::response::{GenerationResult, RawResult};
use ideogram_contracts::{IdeogramError, Result};
use reqwest::blocking::Client as HttpClient;
use reqwest::{StatusCode, Url};
use tracing::{debug, warn};
use uuid::Uuid;

pub const MAX_PROMPT_SNIPPET_CHARS: usize = 50;
pub const IMAGE_EXTENSION: &str = "png";

#[derive(Debug, Clone)]
pub struct ImageMaterializer {
    http: HttpClient,
    output_dir: PathBuf,
}

impl ImageMaterializer {
    pub fn new(http: HttpClient, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            http,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn materialize(
        &self,
        items: Vec<RawResult>,
        fallback_prompt: &str,
    ) -> Result<Vec<GenerationResult>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        fs::create_dir_all(&self.output_dir).map_err(|err| {
            IdeogramError::upstream(format!(
                "failed to create output directory {}: {err}",
                self.output_dir.display()
            ))
        })?;

        let timestamp = filesystem_timestamp();
        let jobs = items
            .into_iter()
            .map(|raw| {
                let id = resolve_image_id(raw.id.as_deref(), &raw.url);
                let prompt = raw.prompt.as_deref().unwrap_or(fallback_prompt);
                let path = self
                    .output_dir
                    .join(image_file_name(&timestamp, prompt, &id));
                (raw, id, path)
            })
            .collect::<Vec<(RawResult, String, PathBuf)>>();

        fan_out(jobs, |(raw, id, path)| {
            self.download(&raw.url, &path)?;
            debug!(id = %id, path = %path.display(), "image saved");
            Ok(GenerationResult::from_raw(raw, id, path))
        })
    }

    fn download(&self, url: &str, path: &Path) -> Result<()> {
        let mut response = self.http.get(url).send().map_err(|err| {
            IdeogramError::upstream(format!("failed downloading image ({url}): {err}"))
        })?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(IdeogramError::upstream(format!(
                "image download failed ({}): {url}",
                status.as_u16()
            )));
        }

        let mut file = File::create(path).map_err(|err| {
            IdeogramError::upstream(format!("failed to create {}: {err}", path.display()))
        })?;
        let written = io::copy(&mut response, &mut file).and_then(|_| file.flush());
        if let Err(err) = written {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %cleanup, "failed to remove partial image");
            }
            return Err(IdeogramError::upstream(format!(
                "failed writing {}: {err}",
                path.display()
            )));
        }
        Ok(())
    }
}

/// Runs `work` for every job on its own thread, joining in input order.
///
/// Waits for every job before returning; the first failure in input order wins.
pub(crate) fn fan_out<T, R, F>(jobs: Vec<T>, work: F) -> Result<Vec<R>>
where
    T: Send,
    R: Send,
    F: Fn(T) -> Result<R> + Sync,
{
    thread::scope(|scope| {
        let work = &work;
        let handles = jobs
            .into_iter()
            .map(|job| scope.spawn(move || work(job)))
            .collect::<Vec<_>>();

        let mut results = Vec::with_capacity(handles.len());
        let mut first_error = None;
        for handle in handles {
            let outcome = handle
                .join()
                .unwrap_or_else(|_| Err(IdeogramError::upstream("image download worker panicked")));
            match outcome {
                Ok(value) => results.push(value),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(results),
        }
    })
}

/// Upstream id, else the URL's file stem, else a synthesized id.
pub fn resolve_image_id(upstream_id: Option<&str>, url: &str) -> String {
    if let Some(id) = upstream_id.map(str::trim).filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    id_from_url(url).unwrap_or_else(synthesized_id)
}

fn id_from_url(url: &str) -> Option<String> {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    let segment = path.rsplit('/').next().unwrap_or_default();
    let stem = segment
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(segment)
        .trim();
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

fn synthesized_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("img_{}_{}", Utc::now().timestamp_millis(), &suffix[..8])
}

pub fn sanitize_prompt(prompt: &str) -> String {
    let snippet = prompt
        .chars()
        .take(MAX_PROMPT_SNIPPET_CHARS)
        .collect::<String>()
        .to_lowercase();
    let joined = snippet.split_whitespace().collect::<Vec<&str>>().join("_");
    joined
        .chars()
        .filter(|ch| is_file_safe(*ch))
        .collect::<String>()
        .trim_matches('_')
        .to_string()
}

pub fn image_file_name(timestamp: &str, prompt: &str, id: &str) -> String {
    let id = id.chars().filter(|ch| is_file_safe(*ch)).collect::<String>();
    let snippet = sanitize_prompt(prompt);
    if snippet.is_empty() {
        format!("{timestamp}_{id}.{IMAGE_EXTENSION}")
    } else {
        format!("{timestamp}_{snippet}_{id}.{IMAGE_EXTENSION}")
    }
}

fn is_file_safe(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn filesystem_timestamp() -> String {
    Utc::now()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    use ideogram_contracts::response::RawResult;
    use ideogram_contracts::IdeogramError;
    use mockito::Matcher;
    use reqwest::blocking::Client as HttpClient;

    use super::{
        fan_out, filesystem_timestamp, image_file_name, resolve_image_id, sanitize_prompt,
        ImageMaterializer,
    };

    #[test]
    fn sanitize_prompt_normalizes_punctuation_and_spacing() {
        assert_eq!(sanitize_prompt("A Cat! By the Lake_2024"), "a_cat_by_the_lake_2024");
        assert_eq!(sanitize_prompt("  __Hello,   World__  "), "hello_world");
        assert_eq!(sanitize_prompt("!!!"), "");
        assert_eq!(sanitize_prompt("café au lait"), "caf_au_lait");
    }

    #[test]
    fn sanitize_prompt_is_idempotent() {
        for prompt in [
            "A Cat! By the Lake_2024",
            "   spaced   out   ",
            "a very long prompt that keeps going well past the fifty character limit",
            "-dash- _under_",
        ] {
            let once = sanitize_prompt(prompt);
            assert_eq!(sanitize_prompt(&once), once, "{prompt}");
        }
    }

    #[test]
    fn sanitize_prompt_uses_first_fifty_characters() {
        let prompt = "x".repeat(80);
        assert_eq!(sanitize_prompt(&prompt).len(), 50);
    }

    #[test]
    fn id_prefers_upstream_then_url_stem() {
        assert_eq!(resolve_image_id(Some("abc"), "https://x/img/zzz.png"), "abc");
        assert_eq!(
            resolve_image_id(None, "https://x/img/abc123.png?sig=xyz"),
            "abc123"
        );
        assert_eq!(resolve_image_id(Some("  "), "https://x/img/def.jpeg"), "def");
        assert_eq!(resolve_image_id(None, "not a url/ghi.png?x=1"), "ghi");
    }

    #[test]
    fn id_is_synthesized_when_url_has_no_stem() {
        let id = resolve_image_id(None, "https://x/img/");
        assert!(id.starts_with("img_"), "{id}");
        let parts = id.split('_').collect::<Vec<&str>>();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }

    #[test]
    fn file_name_combines_timestamp_prompt_and_id() {
        assert_eq!(
            image_file_name("2024-01-01T00-00-00-000Z", "A Cat!", "abc"),
            "2024-01-01T00-00-00-000Z_a_cat_abc.png"
        );
        assert_eq!(
            image_file_name("2024-01-01T00-00-00-000Z", "???", "abc"),
            "2024-01-01T00-00-00-000Z_abc.png"
        );
    }

    #[test]
    fn timestamp_has_no_colons_or_periods() {
        let stamp = filesystem_timestamp();
        assert!(!stamp.contains(':'));
        assert!(!stamp.contains('.'));
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn fan_out_preserves_order_regardless_of_completion() -> anyhow::Result<()> {
        let finished = Mutex::new(Vec::new());
        let delays = vec![(0, 150u64), (1, 60), (2, 0)];
        let results = fan_out(delays, |(idx, delay_ms)| {
            thread::sleep(Duration::from_millis(delay_ms));
            if let Ok(mut order) = finished.lock() {
                order.push(idx);
            }
            Ok(idx)
        })?;
        assert_eq!(results, vec![0, 1, 2]);
        let completion = finished.lock().map(|order| order.clone()).unwrap_or_default();
        assert_eq!(completion, vec![2, 1, 0]);
        Ok(())
    }

    #[test]
    fn fan_out_waits_for_all_and_fails_together() {
        let finished = Mutex::new(0usize);
        let outcome = fan_out(vec![0, 1, 2], |idx| {
            if idx == 0 {
                return Err(IdeogramError::upstream("first"));
            }
            thread::sleep(Duration::from_millis(30));
            if let Ok(mut count) = finished.lock() {
                *count += 1;
            }
            Ok(idx)
        });
        assert_eq!(outcome, Err(IdeogramError::upstream("first")));
        assert_eq!(finished.lock().map(|count| *count).unwrap_or_default(), 2);
    }

    #[test]
    fn materialize_downloads_in_upstream_order() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let mut mocks = Vec::new();
        for name in ["first", "second", "third"] {
            mocks.push(
                server
                    .mock("GET", Matcher::Regex(format!("^/img/{name}\\.png")))
                    .with_status(200)
                    .with_header("content-type", "image/png")
                    .with_body(format!("bytes-{name}"))
                    .create(),
            );
        }
        let temp = tempfile::tempdir()?;
        let out_dir = temp.path().join("nested").join("out");
        let materializer = ImageMaterializer::new(HttpClient::new(), &out_dir);

        let mut second = RawResult::new(format!("{}/img/second.png", server.url()));
        second.id = Some("upstream-2".to_string());
        second.prompt = Some("Second Prompt".to_string());
        let items = vec![
            RawResult::new(format!("{}/img/first.png?sig=abc", server.url())),
            second,
            RawResult::new(format!("{}/img/third.png", server.url())),
        ];

        let results = materializer.materialize(items, "Fallback Prompt")?;
        let ids = results.iter().map(|item| item.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["first", "upstream-2", "third"]);

        for (result, name) in results.iter().zip(["first", "second", "third"]) {
            assert_eq!(result.local_path.parent(), Some(out_dir.as_path()));
            assert_eq!(fs::read_to_string(&result.local_path)?, format!("bytes-{name}"));
        }
        let first_name = results[0]
            .local_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        assert!(first_name.ends_with("_fallback_prompt_first.png"), "{first_name}");
        let second_name = results[1]
            .local_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default();
        assert!(second_name.ends_with("_second_prompt_upstream-2.png"), "{second_name}");

        for mock in mocks {
            mock.assert();
        }
        Ok(())
    }

    #[test]
    fn failed_download_fails_call_and_leaves_no_file() -> anyhow::Result<()> {
        let mut server = mockito::Server::new();
        let _missing = server
            .mock("GET", "/img/missing.png")
            .with_status(404)
            .with_body("not found")
            .create();
        let temp = tempfile::tempdir()?;
        let materializer = ImageMaterializer::new(HttpClient::new(), temp.path());

        let items = vec![RawResult::new(format!("{}/img/missing.png", server.url()))];
        let err = materializer.materialize(items, "prompt").err();
        assert!(
            matches!(&err, Some(IdeogramError::Upstream(message)) if message.contains("404")),
            "{err:?}"
        );
        assert_eq!(fs::read_dir(temp.path())?.count(), 0);
        Ok(())
    }

    #[test]
    fn truncated_body_removes_partial_file() -> anyhow::Result<()> {
        use std::io::{self, Write};

        let mut server = mockito::Server::new();
        let _cut = server
            .mock("GET", "/img/cut.png")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"partial")?;
                w.flush()?;
                Err(io::Error::other("connection cut"))
            })
            .create();
        let temp = tempfile::tempdir()?;
        let out_dir = temp.path().join("images");
        let materializer = ImageMaterializer::new(HttpClient::new(), &out_dir);

        let items = vec![RawResult::new(format!("{}/img/cut.png", server.url()))];
        let err = materializer.materialize(items, "prompt").err();
        assert!(matches!(err, Some(IdeogramError::Upstream(_))), "{err:?}");
        assert_eq!(fs::read_dir(&out_dir)?.count(), 0);
        Ok(())
    }

    #[test]
    fn empty_item_list_touches_nothing() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let out_dir = temp.path().join("never");
        let materializer = ImageMaterializer::new(HttpClient::new(), &out_dir);
        assert!(materializer.materialize(Vec::new(), "prompt")?.is_empty());
        assert!(!out_dir.exists());
        Ok(())
    }
}
