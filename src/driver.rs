//! Batch driver: turns a list of files/directories into compiled `.vm`
//! files, logging as it goes and continuing past per-file failures so one
//! bad file in a directory doesn't abort the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::error::DriverError;
use crate::lexer::Lexer;
use crate::parser::compile_source;
use crate::xml::write_tokens;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_COMPILE_FAILURE: i32 = 1;
pub const EXIT_IO_FAILURE: i32 = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct RunOptions {
    pub dump_tokens: bool,
}

/// Compiles every `.jack` file reachable from `paths` and returns the
/// process exit code: an I/O failure anywhere takes priority over a
/// compile failure, which takes priority over success, since an I/O
/// failure means some input was never even looked at.
pub fn run(paths: &[PathBuf], options: &RunOptions) -> i32 {
    let mut had_compile_error = false;
    let mut had_io_error = false;

    let mut files = Vec::new();
    for path in paths {
        match collect_jack_files(path) {
            Ok(mut found) => files.append(&mut found),
            Err(source) => {
                let err = DriverError::Io { path: path.clone(), source };
                error!("{err}");
                had_io_error = true;
            }
        }
    }

    for file in files {
        match compile_file(&file, options) {
            Ok(()) => {}
            Err(err @ DriverError::Io { .. }) => {
                error!("{err}");
                had_io_error = true;
            }
            Err(err @ DriverError::Compile(_)) => {
                error!("{err}");
                had_compile_error = true;
            }
        }
    }

    if had_io_error {
        EXIT_IO_FAILURE
    } else if had_compile_error {
        EXIT_COMPILE_FAILURE
    } else {
        EXIT_SUCCESS
    }
}

/// A directory yields its `.jack` files in sorted order (non-recursive);
/// a direct file path is taken as given.
fn collect_jack_files(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut found: Vec<PathBuf> = fs::read_dir(path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jack"))
            .collect();
        found.sort();
        Ok(found)
    } else {
        Ok(vec![path.to_path_buf()])
    }
}

fn io_error(path: &Path) -> impl Fn(std::io::Error) -> DriverError + '_ {
    move |source| DriverError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn compile_file(path: &Path, options: &RunOptions) -> Result<(), DriverError> {
    let source = fs::read_to_string(path).map_err(io_error(path))?;
    let file_label = path.display().to_string();
    info!("compiling {file_label}");

    if options.dump_tokens {
        let (tokens, _) = Lexer::new(&file_label, &source).lex();
        let xml_path = path.with_extension("xml");
        fs::write(&xml_path, write_tokens(&tokens)).map_err(io_error(&xml_path))?;
        debug!("wrote {}", xml_path.display());
    }

    let (vm_text, error) = compile_source(&file_label, &source);
    if let Some(error) = error {
        return Err(DriverError::Compile(error));
    }

    let vm_path = path.with_extension("vm");
    fs::write(&vm_path, vm_text).map_err(io_error(&vm_path))?;
    info!("wrote {}", vm_path.display());
    Ok(())
}
