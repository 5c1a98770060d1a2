use anyhow::Context;
use colored::Colorize;
use lectern_sdk::{Language, Library, LibraryConfig, ResolvedText, TextRequest, TextTree};
use serde::Serialize;

use crate::cli::*;
use crate::seed::Seed;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let library = open_library(cli.config.as_deref(), cli.seed.as_deref())?;
    match cli.command {
        Command::Parse(args) => cmd_parse(&library, args, &cli.format),
        Command::Text(args) => cmd_text(&library, args, &cli.format),
        Command::Links(args) => cmd_links(&library, args, &cli.format),
        Command::Titles(args) => cmd_titles(&library, args, &cli.format),
    }
}

fn open_library(config: Option<&str>, seed: Option<&str>) -> anyhow::Result<Library> {
    let config = match config {
        Some(path) => LibraryConfig::load(path).with_context(|| format!("loading config {path}"))?,
        None => LibraryConfig::default(),
    };
    let library = Library::builder().config(config).build();
    if let Some(path) = seed {
        Seed::load(path)?.apply(&library)?;
    }
    Ok(library)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

impl From<LanguageArg> for Language {
    fn from(arg: LanguageArg) -> Self {
        match arg {
            LanguageArg::En => Language::English,
            LanguageArg::He => Language::Hebrew,
        }
    }
}

fn cmd_parse(library: &Library, args: ParseArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let r = library.parse(&args.citation, !args.no_pad)?;
    if let OutputFormat::Json = format {
        return print_json(&r);
    }
    println!("{}", r.canonical().bold());
    println!("  Book: {}", r.book.cyan());
    if let Some(he) = &r.he_title {
        println!("  Hebrew: {he}");
    }
    println!("  Categories: {}", r.categories.join(" / "));
    println!("  Sections: {}", join_numbers(&r.sections).yellow());
    if r.to_sections != r.sections {
        println!("  To: {}", join_numbers(&r.to_sections).yellow());
    }
    println!("  URL: {}", library.url_ref(&args.citation)?.blue());
    Ok(())
}

fn cmd_text(library: &Library, args: TextArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let mut request = TextRequest::new(&args.citation);
    if let Some(context) = args.context {
        request = request.with_context(context);
    }
    if let Some(version) = &args.version {
        let language = args.lang.map(Language::from).unwrap_or(Language::English);
        request = request.with_version(language, version);
    }
    if args.no_commentary {
        request = request.without_commentary();
    }
    let text = library.fetch(&request)?;
    if let OutputFormat::Json = format {
        return print_json(&text);
    }
    print_text(&text);
    Ok(())
}

fn print_text(text: &ResolvedText) {
    println!("{}", text.title.bold());
    if let Some(version) = &text.version_title {
        println!("  Version: {}", version.cyan());
    }
    for line in render_tree(&text.text) {
        println!("  {line}");
    }
    if !text.he.is_text_empty() {
        if let Some(version) = &text.he_version_title {
            println!("  Hebrew version: {}", version.cyan());
        }
        for line in render_tree(&text.he) {
            println!("  {line}");
        }
    }
    if let Some(commentary) = &text.commentary {
        println!("  {} linked", commentary.len().to_string().bold());
    }
    if let Some(prev) = &text.prev {
        println!("  Prev: {}", prev.dimmed());
    }
    if let Some(next) = &text.next {
        println!("  Next: {}", next.dimmed());
    }
}

fn cmd_links(library: &Library, args: LinksArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let links = library.links(&args.citation, args.with_text)?;
    if let OutputFormat::Json = format {
        return print_json(&links);
    }
    if links.is_empty() {
        println!("No links.");
    }
    for link in &links {
        println!(
            "{} {} {} ({}, {})",
            link.anchor_ref.yellow(),
            "→".dimmed(),
            link.reference.bold(),
            link.category,
            link.link_type
        );
        if let Some(text) = &link.text {
            for line in render_tree(text) {
                println!("    {line}");
            }
        }
    }
    Ok(())
}

fn cmd_titles(library: &Library, args: TitlesArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let names = if args.categories {
        library.categories()?
    } else {
        library.text_titles()?
    };
    if let OutputFormat::Json = format {
        return print_json(&names);
    }
    for name in &names {
        println!("{name}");
    }
    Ok(())
}

fn join_numbers(sections: &[u32]) -> String {
    sections.iter().map(u32::to_string).collect::<Vec<_>>().join(":")
}

/// One line per non-empty segment, numbered by its position in the tree.
fn render_tree(tree: &TextTree) -> Vec<String> {
    fn walk(tree: &TextTree, path: &mut Vec<usize>, out: &mut Vec<String>) {
        match tree {
            TextTree::Leaf(s) if s.is_empty() => {}
            TextTree::Leaf(s) if path.is_empty() => out.push(s.clone()),
            TextTree::Leaf(s) => {
                let label = path.iter().map(usize::to_string).collect::<Vec<_>>().join(":");
                out.push(format!("{} {s}", label.dimmed()));
            }
            TextTree::Node(children) => {
                for (i, child) in children.iter().enumerate() {
                    path.push(i + 1);
                    walk(child, path, out);
                    path.pop();
                }
            }
        }
    }
    let mut out = Vec::new();
    walk(tree, &mut Vec::new(), &mut out);
    out
}
