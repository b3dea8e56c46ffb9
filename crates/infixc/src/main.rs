//! The Infix compiler CLI.
//!
//! Thin orchestrator over the core crates: read file -> preprocess ->
//! tokenize -> parse -> generate IR -> (optionally) invoke `llc` and the
//! system linker -> (optionally) execute the resulting binary. It owns
//! no language semantics of its own; all of that lives in `infix-lexer`,
//! `infix-parser`, `infix-ir`, and `infix-codegen`.

mod diagnostics;
mod preprocess;

use std::path::{Path, PathBuf};
use std::process::{self, Command};

use clap::Parser as ClapParser;
use infix_codegen::{link, Generator};
use infix_common::Diagnostic;

#[derive(ClapParser)]
#[command(name = "infixc", version, about = "The Infix compiler")]
struct Cli {
    /// Print the token stream and exit.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed AST and exit.
    #[arg(long)]
    ast: bool,

    /// Print the module's resolved symbol table and exit.
    #[arg(long = "type-checker")]
    type_checker: bool,

    /// Print the generated LLVM IR text and exit.
    #[arg(long = "code-gen")]
    code_gen: bool,

    /// Print target assembly (via `llc`) and exit.
    #[arg(long)]
    asm: bool,

    /// Compile and link but do not run the resulting executable.
    #[arg(long = "build-only")]
    build_only: bool,

    /// Source file to compile.
    file: PathBuf,

    /// Arguments forwarded to the compiled program.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    program_args: Vec<String>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(code) = run(&cli) {
        process::exit(code);
    }
}

fn run(cli: &Cli) -> Result<(), i32> {
    let include_dir = cli.file.parent().unwrap_or_else(|| Path::new(".")).join("include");

    let preprocessed = preprocess::preprocess(&cli.file, &include_dir).map_err(|e| {
        eprintln!("error: {e} [{}]", e.code());
        1
    })?;

    log::debug!("preprocessed {} bytes from {}", preprocessed.len(), cli.file.display());

    let tokens = infix_lexer::tokenize(&preprocessed).map_err(|e| {
        diagnostics::report(&cli.file, &preprocessed, &e);
        1
    })?;

    if cli.tokens {
        for token in &tokens {
            println!("{token:?}");
        }
        return Ok(());
    }

    let ast = infix_parser::parse(tokens).map_err(|e| {
        diagnostics::report(&cli.file, &preprocessed, &e);
        1
    })?;

    if cli.ast {
        println!("{ast:#?}");
        return Ok(());
    }

    let module = Generator::new().build(&ast).map_err(|e| {
        diagnostics::report(&cli.file, &preprocessed, &e);
        1
    })?;

    if cli.type_checker {
        print_symbol_table(&module);
        return Ok(());
    }

    let ir_text = module.to_llvm_ir();

    if cli.code_gen {
        println!("{ir_text}");
        return Ok(());
    }

    let base = cli.file.with_extension("");
    let ir_path = base.with_extension("ll");
    std::fs::write(&ir_path, &ir_text).map_err(|e| {
        eprintln!("error: failed to write '{}': {e}", ir_path.display());
        1
    })?;

    if cli.asm {
        let asm_path = base.with_extension("s");
        emit_assembly(&ir_path, &asm_path)?;
        let text = std::fs::read_to_string(&asm_path).map_err(|e| {
            eprintln!("error: failed to read '{}': {e}", asm_path.display());
            1
        })?;
        println!("{text}");
        return Ok(());
    }

    let object_path = base.with_extension("o");
    link::assemble(&ir_path, &object_path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    std::fs::remove_file(&ir_path).ok();

    let exe_path = base;
    link::link(&object_path, &exe_path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    log::info!("compiled: {}", exe_path.display());

    if cli.build_only {
        return Ok(());
    }

    run_executable(&exe_path, &cli.program_args)
}

fn emit_assembly(ir_path: &Path, asm_path: &Path) -> Result<(), i32> {
    let output = Command::new("llc")
        .arg(ir_path)
        .arg("-o")
        .arg(asm_path)
        .output()
        .map_err(|e| {
            eprintln!("error: failed to invoke llc: {e}");
            1
        })?;
    if !output.status.success() {
        eprintln!("error: llc failed:\n{}", String::from_utf8_lossy(&output.stderr));
        return Err(1);
    }
    Ok(())
}

fn run_executable(exe_path: &Path, program_args: &[String]) -> Result<(), i32> {
    let status = Command::new(exe_path).args(program_args).status().map_err(|e| {
        eprintln!("error: failed to execute '{}': {e}", exe_path.display());
        1
    })?;
    if !status.success() {
        return Err(status.code().unwrap_or(1));
    }
    Ok(())
}

fn print_symbol_table(module: &infix_ir::Module) {
    println!("; variables");
    for var in module.variables.values() {
        println!("{} : {}", var.name, var.ty.name);
    }
    println!("; externals");
    for ext in module.externals.values() {
        let args: Vec<_> = ext.args.iter().map(|a| a.name.clone()).collect();
        println!("{}({}) -> {}", ext.name, args.join(", "), ext.rtype.name);
    }
    println!("; functions");
    for func in module.functions.values() {
        if !func.used {
            continue;
        }
        let args: Vec<_> = func.args.values().map(|a| format!("{}: {}", a.name, a.ty.name)).collect();
        println!("{}({}) -> {}", func.name, args.join(", "), func.rtype.name);
    }
}
