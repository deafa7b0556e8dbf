// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* content and a [link][ref].\n\n- Bullet point\n    - Nested item\n- Another item\n\n```rust\nfn example() {\n\tprintln!(\"Hello\");\n}\n```\n\n[ref]: http://example.com\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_nested_lists(depth: usize, width: usize) -> String {
    let mut content = String::new();
    for item in 0..width {
        for level in 0..depth {
            let indent = "    ".repeat(level);
            content.push_str(&format!("{indent}- Item {item} at level {level}\n"));
        }
    }
    content.push('\n');
    content
}
