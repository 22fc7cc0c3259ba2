use anyhow::Context;
use clap::Parser;
use log::debug;
use mjc::{ast, CompileOptions, Compiler};
use std::{fs, path::PathBuf, process};

/// mjc: semantic analyzer and x86-64 NASM code generator for a Java-like,
/// single-inheritance language. Reads a JSON-serialized AST (the lexer and
/// parser are out of scope for this crate) and writes an assembly file.
#[derive(Debug, Parser)]
#[clap(name = "mjc")]
struct Opt {
    /// Path to the JSON-serialized AST to compile.
    #[clap(long = "ast", short = 'a')]
    ast_path: PathBuf,

    /// Path to write the generated NASM assembly to.
    #[clap(long = "out", short = 'o')]
    out_path: PathBuf,

    /// Interleave cosmetic comments (source-derived) into the generated
    /// assembly.
    #[clap(long = "emit-comments")]
    emit_comments: bool,
}

fn read_ast(path: &PathBuf) -> anyhow::Result<ast::Program> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read AST file {:?}", path))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse AST JSON in {:?}", path))
}

fn run(opt: Opt) -> anyhow::Result<()> {
    let program = read_ast(&opt.ast_path)?;
    debug!("loaded AST: {:?}", program);

    let options = CompileOptions {
        emit_comments: opt.emit_comments,
    };
    let asm = Compiler::new(program)
        .debug()
        .check()
        .map_err(|e| anyhow::anyhow!("{}", e))?
        .debug()
        .generate(options);

    fs::write(&opt.out_path, asm)
        .with_context(|| format!("failed to write output file {:?}", opt.out_path))?;
    Ok(())
}

fn main() {
    env_logger::init();
    let exit_code = match run(Opt::parse()) {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("{:#}", err);
            1
        }
    };
    process::exit(exit_code);
}
