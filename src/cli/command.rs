use crate::{
    analyser::{Analyser, C0},
    emit,
    tokenizer::Tokenizer,
};
use ansi_term::Color::Red;
use anyhow::Context;
use itertools::Itertools;
use log::info;
use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};
use structopt::StructOpt;

#[cfg(windows)]
pub fn terminal_init() {
    // Without ANSI support the colour codes are printed verbatim, which is
    // still readable.
    let _ = ansi_term::enable_ansi_support();
}

#[cfg(not(windows))]
pub fn terminal_init() {}

fn logger_init(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .try_init();
}

pub const DEFAULT_OUTPUT: &str = "out";
const STDIO: &str = "-";

#[derive(StructOpt, Debug)]
#[structopt(name = "cc0", about = "Compiles C0 source into assembly text or a binary module.")]
pub struct CommandRoot {
    /// Source file to read, or `-` for standard input.
    #[structopt(name = "input", parse(from_os_str))]
    input: PathBuf,

    /// Print the token stream.
    #[structopt(short = "t", long = "tokens")]
    tokens: bool,

    /// Translate the input into a text assembly listing.
    #[structopt(short = "s")]
    assembly: bool,

    /// Translate the input into a binary module.
    #[structopt(short = "c")]
    binary: bool,

    /// Read a binary module and print its assembly listing.
    #[structopt(short = "d", long = "disassemble")]
    disassemble: bool,

    /// Output file, or `-` for standard output.
    #[structopt(short = "o", long = "output", parse(from_os_str))]
    output: Option<PathBuf>,

    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Tokens,
    Assembly,
    Binary,
    Disassemble,
}

impl CommandRoot {
    /// The selected mode, if exactly one was asked for.
    pub fn mode(&self) -> Option<Mode> {
        let selected = [
            (self.tokens, Mode::Tokens),
            (self.assembly, Mode::Assembly),
            (self.binary, Mode::Binary),
            (self.disassemble, Mode::Disassemble),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, mode)| *mode)
        .collect::<Vec<_>>();

        match selected.as_slice() {
            [mode] => Some(*mode),
            _ => None,
        }
    }
}

pub fn root(cmd: CommandRoot) -> ! {
    logger_init(cmd.verbose);

    let mode = match cmd.mode() {
        Some(mode) => mode,
        None => {
            eprintln!(
                "{}\n",
                Red.paint("You must give exactly one of -t, -s, -c or -d.")
            );
            let _ = CommandRoot::clap().write_help(&mut io::stderr());
            eprintln!();
            std::process::exit(2);
        }
    };

    match execute(&cmd, mode) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            eprintln!("{}", Red.paint(format!("{:#}", err)));
            std::process::exit(2);
        }
    }
}

fn open_input(path: &Path) -> anyhow::Result<Box<dyn Read>> {
    if path == Path::new(STDIO) {
        return Ok(Box::new(io::stdin()));
    }
    let file = File::open(path).with_context(|| format!("Fail to open {} for reading", path.display()))?;
    Ok(Box::new(file))
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_OUTPUT));
    if path == Path::new(STDIO) {
        return Ok(Box::new(io::stdout()));
    }
    let file = File::create(path).with_context(|| format!("Fail to open {} for writing", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Produces the bytes to write for `mode`. Nothing is written unless the
/// whole pipeline succeeds.
pub fn translate(input: impl Read, mode: Mode) -> anyhow::Result<Vec<u8>> {
    if mode == Mode::Disassemble {
        let mut bytes = Vec::new();
        let mut input = input;
        input
            .read_to_end(&mut bytes)
            .context("Fail to read the module")?;
        let module = emit::read_module(&bytes).context("Disassembly error")?;
        return Ok(module.to_string().into_bytes());
    }

    let tokens = Tokenizer::new(input)
        .all_tokens()
        .map_err(crate::Error::from)?;
    info!("{} tokens", tokens.len());

    if mode == Mode::Tokens {
        let mut listing = tokens.iter().join("\n");
        if !listing.is_empty() {
            listing.push('\n');
        }
        return Ok(listing.into_bytes());
    }

    let analysis = C0.analyse(&tokens).map_err(crate::Error::from)?;
    info!(
        "{} constants, {} code segments",
        analysis.constants.len(),
        analysis.code.len()
    );

    Ok(match mode {
        Mode::Binary => emit::to_binary(&analysis),
        _ => emit::to_assembly(&analysis).into_bytes(),
    })
}

fn execute(cmd: &CommandRoot, mode: Mode) -> anyhow::Result<()> {
    info!("{:?} {}", mode, cmd.input.display());
    let bytes = translate(open_input(&cmd.input)?, mode)?;

    let mut out = open_output(cmd.output.as_deref())?;
    out.write_all(&bytes).context("Fail to write the output")?;
    out.flush().context("Fail to write the output")?;
    Ok(())
}
