use std::sync::Arc;

use tracing::{debug, warn};

use lectern_cache::{CacheService, CacheServiceExt, InMemoryCache, NoCache};
use lectern_index::IndexRegistry;
use lectern_links::{LinkGraph, NoteBook, SectionText, TextSource};
use lectern_refs::{
    is_spanning, next_section, prev_section, section_to_daf, section_to_daf_he, split_span, widen,
    Ref, RefParser,
};
use lectern_store::{
    Authorizer, HistoryRecorder, InMemoryLinkStore, InMemoryNoteStore, InMemoryTextStore,
    LinkStore, NoopHistory, NoopIndexer, NoteStore, SearchIndexer, StaticAuthorizer, TextStore,
};
use lectern_types::{Language, TextTree, VersionedText};

use crate::config::LibraryConfig;
use crate::error::{SdkError, SdkResult};
use crate::request::{ResolvedText, TextRequest, VersionSummary};
use crate::sanitize::Sanitizer;
use crate::text::{assemble, Address, StoredLengths};

/// Cache key of the text title list.
pub(crate) const TITLES_KEY: &str = "text_titles";

/// The text library: every operation on works, texts, links, and notes.
pub struct Library {
    pub(crate) config: LibraryConfig,
    pub(crate) registry: Arc<IndexRegistry>,
    pub(crate) parser: Arc<RefParser>,
    pub(crate) texts: Arc<dyn TextStore>,
    pub(crate) graph: LinkGraph,
    pub(crate) notes: NoteBook,
    pub(crate) cache: Arc<dyn CacheService>,
    pub(crate) history: Arc<dyn HistoryRecorder>,
    pub(crate) indexer: Arc<dyn SearchIndexer>,
    pub(crate) auth: Arc<dyn Authorizer>,
    pub(crate) sanitizer: Sanitizer,
}

/// Assembles a [`Library`]. Anything not supplied is in-memory (stores,
/// cache) or inert (history, indexer, nobody privileged).
#[derive(Default)]
pub struct LibraryBuilder {
    config: LibraryConfig,
    registry: Option<Arc<IndexRegistry>>,
    texts: Option<Arc<dyn TextStore>>,
    links: Option<Arc<dyn LinkStore>>,
    notes: Option<Arc<dyn NoteStore>>,
    cache: Option<Arc<dyn CacheService>>,
    history: Option<Arc<dyn HistoryRecorder>>,
    indexer: Option<Arc<dyn SearchIndexer>>,
    auth: Option<Arc<dyn Authorizer>>,
}

impl LibraryBuilder {
    pub fn config(mut self, config: LibraryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, registry: Arc<IndexRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn text_store(mut self, texts: Arc<dyn TextStore>) -> Self {
        self.texts = Some(texts);
        self
    }

    pub fn link_store(mut self, links: Arc<dyn LinkStore>) -> Self {
        self.links = Some(links);
        self
    }

    pub fn note_store(mut self, notes: Arc<dyn NoteStore>) -> Self {
        self.notes = Some(notes);
        self
    }

    /// Replaces the cache chosen from `config.cache.enabled`.
    pub fn cache(mut self, cache: Arc<dyn CacheService>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn history(mut self, history: Arc<dyn HistoryRecorder>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn indexer(mut self, indexer: Arc<dyn SearchIndexer>) -> Self {
        self.indexer = Some(indexer);
        self
    }

    pub fn authorizer(mut self, auth: Arc<dyn Authorizer>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn build(self) -> Library {
        let config = self.config;
        let registry = self.registry.unwrap_or_else(|| Arc::new(IndexRegistry::new()));
        let parser = Arc::new(RefParser::new(registry.clone()));
        let history = self.history.unwrap_or_else(|| Arc::new(NoopHistory));
        let cache = self.cache.unwrap_or_else(|| -> Arc<dyn CacheService> {
            if config.cache.enabled {
                Arc::new(InMemoryCache::new())
            } else {
                Arc::new(NoCache)
            }
        });
        let links = self.links.unwrap_or_else(|| Arc::new(InMemoryLinkStore::new()));
        let notes = self.notes.unwrap_or_else(|| Arc::new(InMemoryNoteStore::new()));

        Library {
            sanitizer: Sanitizer::new(&config.allowed_tags),
            graph: LinkGraph::new(parser.clone(), links, history.clone()),
            notes: NoteBook::new(parser.clone(), notes, history.clone()),
            texts: self.texts.unwrap_or_else(|| Arc::new(InMemoryTextStore::new())),
            indexer: self.indexer.unwrap_or_else(|| Arc::new(NoopIndexer)),
            auth: self.auth.unwrap_or_else(|| Arc::new(StaticAuthorizer::new())),
            config,
            registry,
            parser,
            cache,
            history,
        }
    }
}

impl Library {
    pub fn builder() -> LibraryBuilder {
        LibraryBuilder::default()
    }

    /// An empty in-memory library with default settings.
    pub fn in_memory() -> Self {
        Self::builder().build()
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<IndexRegistry> {
        &self.registry
    }

    pub fn parser(&self) -> &Arc<RefParser> {
        &self.parser
    }

    pub fn texts(&self) -> &Arc<dyn TextStore> {
        &self.texts
    }

    pub fn link_graph(&self) -> &LinkGraph {
        &self.graph
    }

    pub fn notebook(&self) -> &NoteBook {
        &self.notes
    }

    pub fn cache(&self) -> &Arc<dyn CacheService> {
        &self.cache
    }

    // ---- Ref helpers ----

    pub fn parse(&self, citation: &str, pad: bool) -> SdkResult<Ref> {
        Ok(self.parser.parse(citation, pad)?)
    }

    pub fn norm_ref(&self, citation: &str, pad: bool, context: usize) -> SdkResult<String> {
        Ok(self.parser.norm_ref(citation, pad, context)?)
    }

    pub fn url_ref(&self, citation: &str) -> SdkResult<String> {
        Ok(self.parser.url_ref(citation)?)
    }

    pub fn top_section_ref(&self, citation: &str) -> SdkResult<String> {
        Ok(self.parser.top_section_ref(citation)?)
    }

    pub fn section_level_ref(&self, citation: &str) -> SdkResult<String> {
        Ok(self.parser.section_level_ref(citation)?)
    }

    // ---- Title lists ----

    /// Every citable title and alias, cached until the next index change.
    pub fn text_titles(&self) -> SdkResult<Vec<String>> {
        match self.cache.fetch::<Vec<String>>(TITLES_KEY) {
            Ok(Some(titles)) => return Ok(titles),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "title cache read failed"),
        }
        let titles = self.registry.titles()?;
        if let Err(e) = self.cache.put(TITLES_KEY, &titles, None) {
            warn!(error = %e, "title cache write failed");
        }
        Ok(titles)
    }

    pub fn categories(&self) -> SdkResult<Vec<String>> {
        Ok(self.registry.categories()?)
    }

    /// Versions in either language holding text at `citation`.
    pub fn version_list(&self, citation: &str) -> SdkResult<Vec<VersionSummary>> {
        let r = self.parser.parse(citation, false)?;
        self.versions_at(&r)
    }

    fn versions_at(&self, r: &Ref) -> SdkResult<Vec<VersionSummary>> {
        Ok(self
            .texts
            .versions(&r.book, None)?
            .into_iter()
            .filter(|v| {
                v.content
                    .descend(&r.sections)
                    .is_some_and(|t| !t.is_text_empty())
            })
            .map(|v| VersionSummary {
                version_title: v.version_title,
                language: v.language,
            })
            .collect())
    }

    // ---- Fetch ----

    /// Resolve, assemble, and decorate the text for `request`.
    pub fn fetch(&self, request: &TextRequest) -> SdkResult<ResolvedText> {
        let context = request.context.unwrap_or(self.config.default_context);
        let r = self.parser.parse(&request.reference, request.pad)?;
        if is_spanning(&r) {
            return self.fetch_spanning(&r, request);
        }
        self.fetch_ref(&r, context, request)
    }

    /// One fetch per section the span crosses, concatenated. The combined
    /// result is not cached; the pieces are.
    fn fetch_spanning(&self, r: &Ref, request: &TextRequest) -> SdkResult<ResolvedText> {
        let piece_request = TextRequest {
            context: Some(0),
            commentary: false,
            ..request.clone()
        };
        let pieces = split_span(r, &StoredLengths { texts: self.texts.as_ref() });
        debug!(reference = %r, pieces = pieces.len(), "fetching spanning ref");

        let mut parts = Vec::with_capacity(pieces.len());
        for piece in &pieces {
            parts.push(self.fetch_ref(piece, 0, &piece_request)?);
        }
        let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
            return Err(SdkError::Invalid(format!("{r} splits into no sections")));
        };

        let mut out = shell(r);
        out.prev = first.prev.clone();
        out.next = last.next.clone();
        out.version_title = last.version_title.clone();
        out.version_source = last.version_source.clone();
        out.version_status = last.version_status.clone();
        out.he_version_title = last.he_version_title.clone();
        out.he_version_source = last.he_version_source.clone();
        out.he_version_status = last.he_version_status.clone();
        out.spanning = true;

        let (text, he) = parts
            .into_iter()
            .map(|p| (as_list(p.text), as_list(p.he)))
            .unzip();
        out.text = TextTree::Node(text);
        out.he = TextTree::Node(he);
        Ok(out)
    }

    pub(crate) fn fetch_ref(
        &self,
        r: &Ref,
        context: usize,
        request: &TextRequest,
    ) -> SdkResult<ResolvedText> {
        let key = text_cache_key(r, context, request);
        match self.cache.fetch::<ResolvedText>(&key) {
            Ok(Some(hit)) => {
                debug!(key = %key, "text cache hit");
                return Ok(hit);
            }
            Ok(None) => debug!(key = %key, "text cache miss"),
            Err(e) => warn!(key = %key, error = %e, "text cache read failed"),
        }

        let resolved = self.resolve(r, context, request)?;
        if let Err(e) = self.cache.put(&key, &resolved, self.config.cache.text_ttl()) {
            warn!(key = %key, error = %e, "text cache write failed");
        }
        Ok(resolved)
    }

    fn resolve(&self, r: &Ref, context: usize, request: &TextRequest) -> SdkResult<ResolvedText> {
        let address = Address::of(r, context);
        let en = assemble(&self.candidates(r, Language::English, request)?, &address);
        let he = assemble(&self.candidates(r, Language::Hebrew, request)?, &address);

        let mut out = shell(r);
        out.text = en.text;
        if let Some(v) = en.version {
            out.version_title = Some(v.title);
            out.version_source = Some(v.source);
            out.version_status = Some(v.status);
        }
        out.sources = en.sources;

        out.he = if he.text.is_blank() {
            TextTree::Node(Vec::new())
        } else {
            he.text
        };
        if let Some(v) = he.version {
            out.he_version_title = Some(v.title);
            out.he_version_source = Some(v.source);
            out.he_version_status = Some(v.status);
        }
        out.he_sources = he.sources;

        if request.commentary {
            let anchor = widen(&self.parser.parse(&r.canonical(), true)?, context);
            let links = self.graph.query(&anchor, Some(self)).unwrap_or_else(|e| {
                warn!(reference = %anchor, error = %e, "link query failed");
                Vec::new()
            });
            out.commentary = Some(links);
            out.versions = Some(self.versions_at(r)?);
        }

        let lengths = StoredLengths { texts: self.texts.as_ref() };
        out.next = next_section(r, &lengths);
        out.prev = prev_section(r, &lengths);
        Ok(out)
    }

    /// Stored versions of `r`'s work in `language`, in merge precedence.
    /// A named version applies only to the language it was named for.
    fn candidates(
        &self,
        r: &Ref,
        language: Language,
        request: &TextRequest,
    ) -> SdkResult<Vec<VersionedText>> {
        let mut docs = self.texts.versions(&r.book, Some(language))?;
        if let (Some(version), Some(lang)) = (&request.version, request.language) {
            if lang == language {
                docs.retain(|d| d.version_title == *version);
            }
        }
        Ok(docs)
    }

    // ---- Cache invalidation ----

    /// Forget cached text of the top-level section containing `r`, and of
    /// whole-work requests. A ref without sections forgets the whole work.
    pub(crate) fn invalidate_section(&self, r: &Ref) {
        match r.sections.first() {
            Some(&top) => {
                self.forget(&section_prefix(&r.book, top));
                self.forget(&section_prefix(&r.book, 0));
            }
            None => self.invalidate_work(&r.book),
        }
    }

    pub(crate) fn invalidate_work(&self, book: &str) {
        self.forget(&work_prefix(book));
    }

    /// Invalidate by canonical string; unparsable refs are skipped.
    pub(crate) fn invalidate_citation(&self, citation: &str) {
        match self.parser.parse(citation, false) {
            Ok(r) => self.invalidate_section(&r),
            Err(e) => warn!(reference = %citation, error = %e, "cannot invalidate unparsable ref"),
        }
    }

    fn forget(&self, prefix: &str) {
        match self.cache.delete_prefix(prefix) {
            Ok(removed) => debug!(prefix, removed, "invalidated cached text"),
            Err(e) => warn!(prefix, error = %e, "cache invalidation failed"),
        }
    }

    pub(crate) fn flush_cache(&self) {
        if let Err(e) = self.cache.clear() {
            warn!(error = %e, "cache flush failed");
        }
    }
}

impl TextSource for Library {
    fn text_at(&self, r: &Ref) -> Option<SectionText> {
        let request = TextRequest {
            context: Some(0),
            commentary: false,
            pad: false,
            ..TextRequest::new(r.canonical())
        };
        match self.fetch_ref(r, 0, &request) {
            Ok(found) if found.text.is_text_empty() && found.he.is_text_empty() => None,
            Ok(found) => Some(SectionText {
                text: found.text,
                he: found.he,
            }),
            Err(e) => {
                debug!(reference = %r, error = %e, "no text for link");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Cache keys
// ---------------------------------------------------------------------------

fn book_key(book: &str) -> String {
    book.replace(' ', "_")
}

fn work_prefix(book: &str) -> String {
    format!("text:{}.", book_key(book))
}

/// Keys of one top-level section. Section 0 holds whole-work requests.
fn section_prefix(book: &str, top: u32) -> String {
    format!("{}{top}|", work_prefix(book))
}

/// Shorthand fetches display differently from the expanded ref, so the
/// shorthand name is part of the key.
fn text_cache_key(r: &Ref, context: usize, request: &TextRequest) -> String {
    let shown = match &r.shorthand {
        Some(s) => format!("{}@{}", r.canonical(), s.name),
        None => r.canonical(),
    };
    format!(
        "{}{}({};{};{};{};{})",
        section_prefix(&r.book, r.sections.first().copied().unwrap_or(0)),
        shown,
        context,
        request.commentary,
        request.version.as_deref().unwrap_or("None"),
        request.language.map_or("None", |l| l.code()),
        request.pad,
    )
}

/// A single segment becomes a one-element list so span pieces line up.
fn as_list(tree: TextTree) -> TextTree {
    match tree {
        TextTree::Leaf(s) => TextTree::Node(vec![TextTree::Leaf(s)]),
        node => node,
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

fn display_sections(r: &Ref, sections: &[u32], hidden: usize) -> Vec<String> {
    sections
        .iter()
        .enumerate()
        .skip(hidden)
        .map(|(i, s)| {
            if i == 0 && r.talmud {
                section_to_daf(*s)
            } else {
                s.to_string()
            }
        })
        .collect()
}

/// A response for `r` with every display field filled and no text.
///
/// Sections borrowed through a shorthand are hidden and the shorthand name
/// stands in for the book. Talmud refs show their daf in the title, in both
/// scripts.
fn shell(r: &Ref) -> ResolvedText {
    let hidden = r.shorthand.as_ref().map_or(0, |s| s.depth);
    let book = r
        .shorthand
        .as_ref()
        .map_or_else(|| r.book.clone(), |s| s.name.clone());
    let sections = display_sections(r, &r.sections, hidden);
    let to_sections = display_sections(r, &r.to_sections, hidden);

    let mut he_title = r.he_title.clone();
    let title = match sections.first() {
        None => book.clone(),
        Some(daf) if r.talmud => {
            if let (Some(he), Some(&top)) = (he_title.as_mut(), r.sections.first()) {
                he.push(' ');
                he.push_str(&section_to_daf_he(top));
            }
            match (r.is_commentary(), sections.get(1)) {
                (true, Some(line)) => format!("{book} {daf} Line {line}"),
                _ => format!("{book} {daf}"),
            }
        }
        Some(_) if r.is_commentary() => {
            let shown: Vec<&str> = sections.iter().take(2).map(String::as_str).collect();
            format!("{book} {}", shown.join(":"))
        }
        Some(_) if hidden > 0 => format!("{book} {}", sections.join(":")),
        Some(_) => r.canonical(),
    };

    ResolvedText {
        reference: r.canonical(),
        book,
        title,
        he_title,
        he_book: r.he_title.clone(),
        category: r.root_category().to_string(),
        categories: r.categories.clone(),
        section_names: r.section_names.iter().skip(hidden).cloned().collect(),
        sections,
        to_sections,
        text: TextTree::Node(Vec::new()),
        version_title: None,
        version_source: None,
        version_status: None,
        sources: None,
        he: TextTree::Node(Vec::new()),
        he_version_title: None,
        he_version_source: None,
        he_version_status: None,
        he_sources: None,
        spanning: false,
        commentary: None,
        versions: None,
        next: None,
        prev: None,
    }
}
