//! `cssdump`: parse a stylesheet and print its rules, selectors and
//! specificities.
//!
//! ```text
//! cssdump [--tokens] FILE
//! ```
//!
//! Set `RUST_LOG=debug` to see dropped rules and declarations.

use std::process::ExitCode;

use css::{CssRule, CssRuleInterface, RuleId, Stylesheet, Tokenizer};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut tokens = false;
    let mut path = None;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--tokens" => tokens = true,
            "-h" | "--help" => {
                println!("usage: cssdump [--tokens] FILE");
                return ExitCode::SUCCESS;
            }
            _ => path = Some(arg),
        }
    }
    let Some(path) = path else {
        eprintln!("usage: cssdump [--tokens] FILE");
        return ExitCode::from(2);
    };
    let source = match std::fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("cssdump: {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    if tokens {
        for token in Tokenizer::new(&source).preserve_comments(true).tokenize_all() {
            println!("{}:{}\t{:?}", token.line, token.column, token.kind);
        }
        return ExitCode::SUCCESS;
    }

    tracing::debug!(path = %path, bytes = source.len(), "read stylesheet");
    let sheet = Stylesheet::parse(&source);
    println!("{} rules", sheet.len());
    for &id in sheet.top_level() {
        print_rule(&sheet, id, 0);
    }
    ExitCode::SUCCESS
}

fn print_rule(sheet: &Stylesheet, id: RuleId, depth: usize) {
    let Some(rule) = sheet.rule(id) else { return };
    let indent = "  ".repeat(depth);
    match rule {
        CssRule::Style(style) => {
            println!("{indent}style {}", style.selector_text);
            for selector in &style.selectors.selectors {
                println!("{indent}  selector {selector}  {}", selector.specificity());
            }
            for (name, decl) in style.declarations.iter() {
                let bang = if decl.important { " !important" } else { "" };
                println!("{indent}  {name}: {}{bang}", decl.value_text().trim());
            }
        }
        CssRule::Media(media) => println!("{indent}@media {}", media.media.text()),
        CssRule::Supports(supports) => println!("{indent}@supports {}", supports.condition_text),
        CssRule::Keyframes(keyframes) => println!("{indent}@keyframes {}", keyframes.name),
        CssRule::GenericAt(generic) => println!("{indent}@{} {}", generic.name, generic.prelude),
        other => println!("{indent}{}", other.css_text(sheet)),
    }
    for &child in rule.children() {
        print_rule(sheet, child, depth + 1);
    }
}
