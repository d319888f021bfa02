use std::{
    ffi::OsStr,
    fs,
    path::PathBuf,
    process::{Command, ExitCode},
    rc::Rc,
    time::Instant,
};

use clap::Parser;
use inkwell::context::Context;
use prance::{
    checker::checker::check_file,
    compiler::compiler::{compile, CompileOptions},
    display_error, init_tracing,
    lexer::lexer::tokenize,
    parser::parser::parse,
};

/// Compiles a Prance source file to a native executable.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Source file to compile
    file: PathBuf,

    #[arg(long, help = "Stop after writing the LLVM IR")]
    emit_ir_only: bool,

    #[arg(long, value_name = "DIR", default_value = "build")]
    build_dir: PathBuf,

    #[arg(short, long, value_name = "NAME", default_value = "output")]
    output: String,

    #[arg(long, value_name = "TRIPLE", help = "Target triple, the host's by default")]
    target: Option<String>,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            if !message.is_empty() {
                eprintln!("{}", message);
            }
            ExitCode::FAILURE
        }
    }
}

/// Runs every stage, returning a message for the failure that stopped it.
/// Source errors are reported as they happen and yield an empty message.
fn run(cli: &Cli) -> Result<(), String> {
    let start = Instant::now();

    let source = fs::read_to_string(&cli.file)
        .map_err(|error| format!("Failed to read {}: {}", cli.file.display(), error))?;
    let file_name = cli
        .file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("main.prance"));

    let tokens = tokenize(source, Some(file_name.clone())).map_err(|error| {
        display_error(&error, &cli.file);
        String::new()
    })?;
    println!("Tokenized in {:?}", start.elapsed());

    let parse_start = Instant::now();
    let (_, parsed) = parse(tokens, Rc::new(file_name.clone()));
    let mut file = parsed.map_err(|error| {
        display_error(&error, &cli.file);
        String::new()
    })?;
    println!("Parsed in {:?}", parse_start.elapsed());

    let check_start = Instant::now();
    check_file(&mut file).map_err(|error| {
        display_error(&error, &cli.file);
        String::new()
    })?;
    println!("Type checked in {:?}", check_start.elapsed());

    let compile_start = Instant::now();
    let context = Context::create();
    let stem = cli
        .file
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("main"));
    let options = CompileOptions {
        module_name: stem.clone(),
        target_triple: cli.target.clone(),
        verify: true,
    };
    let module = compile(&file, &context, &options)
        .map_err(|error| format!("Failed to compile {}: {}", file_name, error))?;
    println!("Compiled in {:?}", compile_start.elapsed());

    fs::create_dir_all(&cli.build_dir).map_err(|error| {
        format!("Failed to create {}: {}", cli.build_dir.display(), error)
    })?;
    let ir_path = cli.build_dir.join(format!("{}.ll", stem));
    module
        .print_to_file(&ir_path)
        .map_err(|error| format!("Failed to write {}: {}", ir_path.display(), error))?;
    println!("Total time for IR generation: {:?}", start.elapsed());

    if cli.emit_ir_only {
        return Ok(());
    }

    let object_path = cli.build_dir.join(format!("{}.o", stem));
    let output_path = cli.build_dir.join(&cli.output);

    run_tool(
        "llc",
        &[
            OsStr::new("-filetype=obj"),
            OsStr::new("-relocation-model=pic"),
            ir_path.as_os_str(),
            OsStr::new("-o"),
            object_path.as_os_str(),
        ],
    )?;
    println!("Compiled using LLC");

    run_tool(
        "clang",
        &[
            OsStr::new("-fPIE"),
            OsStr::new("-pie"),
            OsStr::new("-o"),
            output_path.as_os_str(),
            object_path.as_os_str(),
        ],
    )?;
    println!("Compiled using Clang");

    println!("Total time: {:?}", start.elapsed());
    Ok(())
}

fn run_tool(tool: &str, args: &[&OsStr]) -> Result<(), String> {
    tracing::debug!(tool, ?args, "running backend tool");

    let result = Command::new(tool)
        .args(args)
        .output()
        .map_err(|error| format!("Failed to run {}: {}", tool, error))?;

    if !result.status.success() {
        return Err(format!(
            "Failed to compile using {}:\n{}",
            tool,
            String::from_utf8_lossy(&result.stderr)
        ));
    }

    Ok(())
}
