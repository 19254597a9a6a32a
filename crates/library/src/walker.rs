use crate::Context;
use crate::error::Result;
use crate::nodes::{Book, Chapter, Node, Part, write_index};
use async_stream::try_stream;
use futures::Stream;
use std::path::PathBuf;

/// What happened to a chapter during the crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterOutcome {
    /// Fetched, classified and written during this run.
    Written,
    /// Written by a previous run; not fetched.
    Skipped,
    /// Could not be loaded; removed from its section's index.
    Pruned,
}

/// Totals reported once the crawl completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub parts: usize,
    /// Parts whose page could not be fetched this run.
    pub unavailable_parts: usize,
    pub sections: usize,
    pub written: usize,
    pub skipped: usize,
    pub pruned: usize,
    pub indexes: usize,
}

/// Progress events emitted by [`crawl`].
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started) exactly once.
/// 2. [`BookLoaded`](Self::BookLoaded) exactly once.
/// 3. [`PartLoaded`](Self::PartLoaded) once per part, in book order.
/// 4. [`Chapter`](Self::Chapter) once per chapter, in part, section, chapter
///    order.
/// 5. [`IndexWritten`](Self::IndexWritten) for every section, then its part,
///    and finally the book.
/// 6. [`Complete`](Self::Complete) exactly once.
///
/// A fatal error ends the stream early, in which case
/// [`Complete`](Self::Complete) is never emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    Started,
    BookLoaded {
        parts: usize,
    },
    PartLoaded {
        position: usize,
        total: usize,
        title: String,
        sections: usize,
    },
    Chapter {
        position: usize,
        total: usize,
        title: String,
        outcome: ChapterOutcome,
    },
    IndexWritten {
        path: PathBuf,
    },
    Complete(CrawlSummary),
}

/// Walks the whole publication, one request at a time.
///
/// 1. Load the book page into parts.
/// 2. Load every part page into sections and chapter links.
/// 3. Write every chapter whose document does not exist yet. Chapters that
///    cannot be loaded are pruned from their section.
/// 4. Regenerate the indexes bottom-up, so each reflects its final children.
///
/// Fatal: the book cannot be loaded, a part page lacks its sections, or the
/// storage backend fails. Everything else is logged and left for the next
/// run, which resumes from the artifacts already written.
pub fn crawl(ctx: &Context) -> impl Stream<Item = Result<CrawlEvent>> + '_ {
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    try_stream!({
        yield CrawlEvent::Started;
        let mut summary = CrawlSummary::default();

        let mut book = Book::new(ctx.root_url.as_str());
        book.load(ctx).await?;
        summary.parts = book.parts.len();
        yield CrawlEvent::BookLoaded { parts: book.parts.len() };

        let total = book.parts.len();
        for (index, part) in book.parts.iter_mut().enumerate() {
            if !load_part(ctx, part).await? {
                summary.unavailable_parts += 1;
            }
            summary.sections += part.sections.len();
            yield CrawlEvent::PartLoaded {
                position: index + 1,
                total,
                title: part.title().to_string(),
                sections: part.sections.len(),
            };
        }

        let total = book.chapter_count();
        let mut position = 0;
        for part in &mut book.parts {
            for section in &mut part.sections {
                for mut chapter in std::mem::take(&mut section.chapters) {
                    position += 1;
                    let outcome = process_chapter(ctx, &mut chapter).await?;
                    match outcome {
                        ChapterOutcome::Written => summary.written += 1,
                        ChapterOutcome::Skipped => summary.skipped += 1,
                        ChapterOutcome::Pruned => summary.pruned += 1,
                    }
                    yield CrawlEvent::Chapter {
                        position,
                        total,
                        title: chapter.title().to_string(),
                        outcome,
                    };
                    if outcome != ChapterOutcome::Pruned {
                        section.chapters.push(chapter);
                    }
                }
            }
        }

        for part in &book.parts {
            for section in &part.sections {
                let path = write_index(ctx, section).await?;
                summary.indexes += 1;
                yield CrawlEvent::IndexWritten { path };
            }
            let path = write_index(ctx, part).await?;
            summary.indexes += 1;
            yield CrawlEvent::IndexWritten { path };
        }
        let path = write_index(ctx, &book).await?;
        summary.indexes += 1;
        yield CrawlEvent::IndexWritten { path };

        yield CrawlEvent::Complete(summary);
    })
}

/// Loads a part, tolerating transient failures. Returns whether the part
/// page was available.
async fn load_part(ctx: &Context, part: &mut Part) -> Result<bool> {
    match part.load(ctx).await {
        Ok(()) => Ok(true),
        Err(e) if e.is_transient() => {
            tracing::warn!(url = part.url(), error = ?e, "part unavailable, skipping its sections");
            Ok(false)
        },
        Err(e) => Err(e),
    }
}

/// Skips a finished chapter, otherwise loads and writes it. A chapter that
/// fails to load is pruned; a failed write is fatal.
async fn process_chapter(ctx: &Context, chapter: &mut Chapter) -> Result<ChapterOutcome> {
    if chapter.is_written(ctx).await? {
        tracing::debug!(slug = chapter.slug(), "already written, skipping");
        return Ok(ChapterOutcome::Skipped);
    }
    if let Err(e) = chapter.load(ctx).await {
        tracing::warn!(url = chapter.url(), error = ?e, "pruning chapter");
        return Ok(ChapterOutcome::Pruned);
    }
    chapter.write(ctx).await?;
    Ok(ChapterOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImageStore;
    use crate::error::ErrorKind;
    use folio_fetch::HttpFetcher;
    use folio_storage::backend::MockBackend;
    use folio_storage::{BackendHandle, StorageBackend};
    use futures::StreamExt;
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BOOK_PAGE: &str = r#"<html><body><nav>
        <span class="nav-main__sub-rollover" onmouseover="show(1)">Work</span>
        <span class="nav-main__sub-rollover" onmouseover="show(2)">Calm</span>
    </nav></body></html>"#;

    const WORK_PAGE: &str = r#"<html><body>
        <section><div>Ambition</div><ul>
            <li><a href="/chapters/drive/"><span class="title">On Drive</span></a></li>
            <li><a href="/chapters/rest/"><span class="title">On Rest</span></a></li>
        </ul></section>
        <section><div>Careers</div><ul>
            <li><a href="/chapters/missing/"><span class="title">Missing</span></a></li>
            <li><a href="/chapters/bare/"><span class="title">Bare</span></a></li>
        </ul></section>
    </body></html>"#;

    fn chapter_page(heading: &str, image: &str, paragraph: &str) -> String {
        format!(
            r#"<html><body><div class="old-wrapper">
                <p>1. {heading}</p>
                <figure><img src="{image}"></figure>
                <p><em>A desk at dawn.</em></p>
                <p>{paragraph}</p>
                <div class="addtoany_share_save_container"><p>Share</p></div>
                <p>Comments</p>
            </div></body></html>"#
        )
    }

    async fn mount(server: &MockServer, route: &str, response: ResponseTemplate, expected: u64) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(response)
            .expect(expected)
            .mount(server)
            .await;
    }

    fn html(body: impl Into<String>) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(body.into())
    }

    fn context(server: &MockServer, backend: BackendHandle) -> Context {
        let fetcher = HttpFetcher::new("folio-test", Duration::ZERO, Duration::from_secs(5)).unwrap();
        Context::new(Arc::new(fetcher), backend, format!("{}/book", server.uri()))
    }

    async fn run(ctx: &Context) -> Vec<Result<CrawlEvent>> {
        crawl(ctx).collect().await
    }

    async fn snapshot(backend: &MockBackend) -> BTreeMap<PathBuf, Vec<u8>> {
        let mut files = BTreeMap::new();
        for path in backend.paths().await {
            let data = backend.read(&path).await.unwrap();
            files.insert(path, data);
        }
        files
    }

    async fn read_string(backend: &MockBackend, path: &str) -> String {
        String::from_utf8(backend.read(Path::new(path)).await.unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_crawl_is_resumable_and_idempotent() {
        let server = MockServer::start().await;
        let image = format!("{}/img/shared.jpg", server.uri());
        // Everything that produced an artifact is requested exactly once
        // across both runs; what failed is retried by the second run.
        mount(&server, "/book", html(BOOK_PAGE), 1).await;
        mount(&server, "/book/category/Work/", html(WORK_PAGE), 1).await;
        mount(&server, "/book/category/Calm/", ResponseTemplate::new(503), 2).await;
        let drive = chapter_page("Drive", &image, "We <strong>want</strong> more.");
        let rest = chapter_page("Rest", &image, "We <em>must</em> rest.");
        mount(&server, "/chapters/drive/", html(drive), 1).await;
        mount(&server, "/chapters/rest/", html(rest), 1).await;
        mount(&server, "/chapters/missing/", ResponseTemplate::new(404), 2).await;
        mount(&server, "/chapters/bare/", html("<html><body><p>Moved</p></body></html>"), 2).await;
        mount(&server, "/img/shared.jpg", ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8]), 1).await;

        let mock = Arc::new(MockBackend::default());
        let ctx = context(&server, mock.clone());

        let events: Vec<CrawlEvent> = run(&ctx).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(events.first(), Some(&CrawlEvent::Started));
        assert_eq!(events[1], CrawlEvent::BookLoaded { parts: 2 });
        assert_eq!(
            events[2],
            CrawlEvent::PartLoaded {
                position: 1,
                total: 2,
                title: "Work".to_string(),
                sections: 2,
            }
        );
        assert_eq!(
            events[3],
            CrawlEvent::PartLoaded {
                position: 2,
                total: 2,
                title: "Calm".to_string(),
                sections: 0,
            }
        );
        let outcomes: Vec<(usize, usize, &str, ChapterOutcome)> = events
            .iter()
            .filter_map(|event| match event {
                CrawlEvent::Chapter { position, total, title, outcome } => {
                    Some((*position, *total, title.as_str(), *outcome))
                },
                _ => None,
            })
            .collect();
        assert_eq!(
            outcomes,
            vec![
                (1, 4, "On Drive", ChapterOutcome::Written),
                (2, 4, "On Rest", ChapterOutcome::Written),
                (3, 4, "Missing", ChapterOutcome::Pruned),
                (4, 4, "Bare", ChapterOutcome::Pruned),
            ]
        );
        let indexes: Vec<PathBuf> = events
            .iter()
            .filter_map(|event| match event {
                CrawlEvent::IndexWritten { path } => Some(path.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            indexes,
            vec![
                PathBuf::from("book/Work/Ambition/index.rst"),
                PathBuf::from("book/Work/Careers/index.rst"),
                PathBuf::from("book/Work/index.rst"),
                PathBuf::from("book/Calm/index.rst"),
                PathBuf::from("book/index.rst"),
            ]
        );
        assert_eq!(
            events.last(),
            Some(&CrawlEvent::Complete(CrawlSummary {
                parts: 2,
                unavailable_parts: 1,
                sections: 2,
                written: 2,
                skipped: 0,
                pruned: 2,
                indexes: 5,
            }))
        );

        let image_file = ImageStore::file_name(&image);
        assert_eq!(
            read_string(&mock, "book/Work/Ambition/OnDrive/index.rst").await,
            format!(
                ".. _OnDrive:\n\nOn Drive\n========\n\nDrive\n-----\n\n\
                 .. figure:: ../../../../images/{image_file}\n   :figwidth: 100 %\n\n   A desk at dawn.\n\n\
                 We **want** more.\n"
            )
        );
        assert_eq!(
            read_string(&mock, "book/index.rst").await,
            "The Book of Life\n================\n\n.. toctree::\n\n   Work/index\n   Calm/index\n"
        );
        assert_eq!(
            read_string(&mock, "book/Work/index.rst").await,
            ".. _Work:\n\nWork\n====\n\n.. toctree::\n\n   Ambition/index\n   Careers/index\n"
        );
        assert_eq!(
            read_string(&mock, "book/Work/Ambition/index.rst").await,
            ".. _Ambition:\n\nAmbition\n========\n\n.. toctree::\n\n   OnDrive/index\n   OnRest/index\n"
        );
        // Pruned chapters leave no trace in their section.
        assert_eq!(
            read_string(&mock, "book/Work/Careers/index.rst").await,
            ".. _Careers:\n\nCareers\n=======\n\n.. toctree::\n"
        );
        assert_eq!(read_string(&mock, "book/Calm/index.rst").await, ".. _Calm:\n\nCalm\n====\n\n.. toctree::\n");
        // Both chapters share one stored image.
        let images: Vec<PathBuf> =
            mock.paths().await.into_iter().filter(|path| path.starts_with("images")).collect();
        assert_eq!(images, vec![Path::new("images").join(&image_file)]);
        assert!(mock.exists(Path::new("pages/book.html")).await.unwrap());
        assert!(mock.exists(Path::new("pages/Work.html")).await.unwrap());
        assert!(!mock.exists(Path::new("pages/Calm.html")).await.unwrap());

        let first = snapshot(&mock).await;
        let events: Vec<CrawlEvent> = run(&ctx).await.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            events.last(),
            Some(&CrawlEvent::Complete(CrawlSummary {
                parts: 2,
                unavailable_parts: 1,
                sections: 2,
                written: 0,
                skipped: 2,
                pruned: 2,
                indexes: 5,
            }))
        );
        assert_eq!(snapshot(&mock).await, first);
    }

    #[tokio::test]
    async fn test_book_without_parts_is_fatal() {
        let server = MockServer::start().await;
        mount(&server, "/book", html("<html><body><nav></nav></body></html>"), 1).await;
        let mock = Arc::new(MockBackend::default());
        let ctx = context(&server, mock.clone());

        let events = run(&ctx).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap(), &CrawlEvent::Started);
        let err = events[1].as_ref().unwrap_err();
        assert_eq!(
            **err,
            ErrorKind::StructuralMismatch {
                landmark: "part navigation",
                url: format!("{}/book", server.uri()),
            }
        );
        // Nothing is cached or written for a page that did not parse.
        assert!(mock.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_book_fetch_failure_is_fatal() {
        let server = MockServer::start().await;
        mount(&server, "/book", ResponseTemplate::new(503), 1).await;
        let ctx = context(&server, Arc::new(MockBackend::default()));

        let events = run(&ctx).await;
        let err = events.last().unwrap().as_ref().unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(&**err, ErrorKind::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_part_without_sections_is_fatal() {
        let server = MockServer::start().await;
        mount(&server, "/book", html(BOOK_PAGE), 1).await;
        mount(&server, "/book/category/Work/", html("<html><body><p>Moved</p></body></html>"), 1).await;
        let ctx = context(&server, Arc::new(MockBackend::default()));

        let events = run(&ctx).await;
        let err = events.last().unwrap().as_ref().unwrap_err();
        assert!(matches!(&**err, ErrorKind::StructuralMismatch { landmark: "section", .. }));
        assert!(!events.iter().any(|event| matches!(event, Ok(CrawlEvent::Complete(_)))));
    }

    #[tokio::test]
    async fn test_cached_pages_are_reused() {
        let server = MockServer::start().await;
        // No routes: any request would be answered with a 404.
        let mock = Arc::new(MockBackend::with_files([
            ("pages/book.html", BOOK_PAGE.as_bytes().to_vec()),
            ("pages/Work.html", WORK_PAGE.as_bytes().to_vec()),
            ("pages/Calm.html", WORK_PAGE.as_bytes().to_vec()),
            ("book/Work/Ambition/OnDrive/index.rst", b"done".to_vec()),
            ("book/Work/Ambition/OnRest/index.rst", b"done".to_vec()),
            ("book/Work/Careers/Missing/index.rst", b"done".to_vec()),
            ("book/Work/Careers/Bare/index.rst", b"done".to_vec()),
            ("book/Calm/Ambition/OnDrive/index.rst", b"done".to_vec()),
            ("book/Calm/Ambition/OnRest/index.rst", b"done".to_vec()),
            ("book/Calm/Careers/Missing/index.rst", b"done".to_vec()),
            ("book/Calm/Careers/Bare/index.rst", b"done".to_vec()),
        ]));
        let ctx = context(&server, mock.clone());

        let events: Vec<CrawlEvent> = run(&ctx).await.into_iter().map(Result::unwrap).collect();
        let Some(CrawlEvent::Complete(summary)) = events.last() else {
            panic!("crawl did not complete");
        };
        assert_eq!(summary.skipped, 8);
        assert_eq!(summary.written + summary.pruned + summary.unavailable_parts, 0);
        assert!(server.received_requests().await.unwrap().is_empty());
        // Finished chapters are never rewritten.
        assert_eq!(read_string(&mock, "book/Work/Ambition/OnDrive/index.rst").await, "done");
    }
}
