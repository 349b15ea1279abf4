// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fs::File;
use std::io::{self, Read, Write};
use std::process;

use pico_args::Arguments;
use svgprune::svgprune_tree::{Indent, WriteOptions};

const HELP: &str = "\
svgprune removes SVG elements that do not paint anything.

USAGE:
  svgprune [OPTIONS] <in-svg> <out-svg>  # from file to file
  svgprune [OPTIONS] <in-svg> -c         # from file to stdout
  svgprune [OPTIONS] - <out-svg>         # from stdin to file
  svgprune [OPTIONS] - -c                # from stdin to stdout

OPTIONS:
  -h, --help                        Prints help information
  -V, --version                     Prints version information
  -c                                Prints the output SVG to the stdout

  --keep-empty-groups               Do not remove groups that became empty
                                    after invisible elements removal
  --zero-opacity-is-none            Treats elements with both 'fill-opacity'
                                    and 'stroke-opacity' set to zero as invisible
  --display-none-is-invisible       Treats elements with 'display:none' as invisible
  --remove-desc                     Removes all 'desc' elements
  --remove-title                    Removes all 'title' elements

  --indent INDENT                   Sets the XML nodes indent
                                    [values: none, 0, 1, 2, 3, 4, tabs] [default: 4]
  --attrs-indent INDENT             Sets the XML attributes indent
                                    [values: none, 0, 1, 2, 3, 4, tabs] [default: none]
  --verbose                         Prints each removed element
  --quiet                           Disables warnings

ARGS:
  <in-svg>                          Input file
  <out-svg>                         Output file
";

#[derive(Debug)]
struct Args {
    keep_empty_groups: bool,
    zero_opacity_is_none: bool,
    display_none_is_invisible: bool,
    remove_desc: bool,
    remove_title: bool,

    indent: Indent,
    attrs_indent: Indent,

    verbose: bool,
    quiet: bool,

    input: String,
    output: String,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    Ok(Args {
        keep_empty_groups: input.contains("--keep-empty-groups"),
        zero_opacity_is_none: input.contains("--zero-opacity-is-none"),
        display_none_is_invisible: input.contains("--display-none-is-invisible"),
        remove_desc: input.contains("--remove-desc"),
        remove_title: input.contains("--remove-title"),

        indent: input
            .opt_value_from_fn("--indent", parse_indent)?
            .unwrap_or(Indent::Spaces(4)),
        attrs_indent: input
            .opt_value_from_fn("--attrs-indent", parse_indent)?
            .unwrap_or(Indent::None),

        verbose: input.contains("--verbose"),
        quiet: input.contains("--quiet"),

        input: input.free_from_str()?,
        output: input.free_from_str()?,
    })
}

fn parse_indent(s: &str) -> Result<Indent, String> {
    let indent = match s {
        "none" => Indent::None,
        "0" => Indent::Spaces(0),
        "1" => Indent::Spaces(1),
        "2" => Indent::Spaces(2),
        "3" => Indent::Spaces(3),
        "4" => Indent::Spaces(4),
        "tabs" => Indent::Tabs,
        _ => return Err("invalid INDENT value".to_string()),
    };

    Ok(indent)
}

#[derive(Clone, PartialEq, Debug)]
enum InputFrom<'a> {
    Stdin,
    File(&'a str),
}

#[derive(Clone, PartialEq, Debug)]
enum OutputTo<'a> {
    Stdout,
    File(&'a str),
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            let level = if args.verbose {
                log::LevelFilter::Info
            } else {
                log::LevelFilter::Warn
            };
            log::set_max_level(level);
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let (in_svg, out_svg) = {
        let in_svg = args.input.as_str();
        let out_svg = args.output.as_str();

        let svg_from = if in_svg == "-" {
            InputFrom::Stdin
        } else if in_svg == "-c" {
            return Err("-c should be set after input".to_string());
        } else {
            InputFrom::File(in_svg)
        };

        let svg_to = if out_svg == "-c" {
            OutputTo::Stdout
        } else {
            OutputTo::File(out_svg)
        };

        (svg_from, svg_to)
    };

    let opt = svgprune::Options {
        remove_empty_groups: !args.keep_empty_groups,
        zero_opacity_is_invisible: args.zero_opacity_is_none,
        display_none_is_invisible: args.display_none_is_invisible,
        remove_desc: args.remove_desc,
        remove_title: args.remove_title,
    };

    let xml_opt = WriteOptions {
        use_single_quote: false,
        indent: args.indent,
        attributes_indent: args.attrs_indent,
    };

    let input_svg = match in_svg {
        InputFrom::Stdin => load_stdin(),
        InputFrom::File(path) => std::fs::read(path).map_err(|e| e.to_string()),
    }?;

    let (s, _) = svgprune::prune_data(&input_svg, &opt, &xml_opt).map_err(|e| e.to_string())?;

    match out_svg {
        OutputTo::Stdout => {
            io::stdout()
                .write_all(s.as_bytes())
                .map_err(|_| "failed to write to the stdout".to_string())?;
        }
        OutputTo::File(path) => {
            let mut f =
                File::create(path).map_err(|_| "failed to create the output file".to_string())?;
            f.write_all(s.as_bytes())
                .map_err(|_| "failed to write to the output file".to_string())?;
        }
    }

    Ok(())
}

fn load_stdin() -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let stdin = io::stdin();
    let mut handle = stdin.lock();

    handle
        .read_to_end(&mut buf)
        .map_err(|_| "failed to read from stdin".to_string())?;

    Ok(buf)
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);
            let args = record.args();

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, args),
                log::Level::Warn => eprintln!("Warning (in {}:{}): {}", target, line, args),
                // Removal reports are meant for users, not for debugging.
                log::Level::Info => eprintln!("{}", args),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, args),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, args),
            }
        }
    }

    fn flush(&self) {}
}
