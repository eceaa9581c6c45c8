//! Scaffolds a minimal starter file for the `init` sub-command: a
//! syntactically valid entry point with no metadata involvement.

use std::fs;
use std::io;
use std::path::Path;

use goatcore::config::DEFAULT_MARKER_PACKAGE;

/// Renders the starter source text: an options record, an initializer
/// using the Default marker, a run function, and a placeholder
/// entry point for `emit` to later replace.
pub fn scaffold_source(command_name: &str, marker_package_path: &str) -> String {
    format!(
        r#"package main

import (
	"fmt"

	"{marker_package_path}"
)

// Options are the command-line options for {command_name}.
type Options struct {{
	// Name is who to greet.
	Name string
}}

func newOptions() *Options {{
	return &Options{{
		Name: goat.Default("world"),
	}}
}}

func run(opts *Options) error {{
	fmt.Printf("hello, %s\n", opts.Name)
	return nil
}}

func main() {{
	opts := newOptions()
	if err := run(opts); err != nil {{
		panic(err)
	}}
}}
"#,
        marker_package_path = marker_package_path,
        command_name = command_name,
    )
}

/// Writes the scaffolded source to `target_path`, failing if the file
/// already exists so `init` never clobbers an existing target.
pub fn scaffold_project(target_path: &Path, command_name: &str) -> io::Result<()> {
    let source = scaffold_source(command_name, DEFAULT_MARKER_PACKAGE);
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    use std::io::Write as _;
    let mut file = options.open(target_path)?;
    file.write_all(source.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaffold_source_is_syntactically_plausible() {
        let src = scaffold_source("greeter", "example.com/goat");
        assert!(src.contains("package main"));
        assert!(src.contains("type Options struct"));
        assert!(src.contains("func newOptions() *Options"));
        assert!(src.contains("func run(opts *Options) error"));
        assert!(src.contains("func main()"));
        assert!(src.contains("goat.Default(\"world\")"));
        assert!(src.contains("\"example.com/goat\""));
    }

    #[test]
    fn scaffold_project_refuses_to_overwrite() {
        let dir = std::env::temp_dir().join(format!("goat-scaffold-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let target = dir.join("main.go");

        scaffold_project(&target, "greeter").unwrap();
        let err = scaffold_project(&target, "greeter").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        fs::remove_dir_all(&dir).ok();
    }
}
