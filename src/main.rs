use cc0::cli::command::{root, terminal_init, CommandRoot};
use structopt::StructOpt;

fn main() {
    terminal_init();
    root(CommandRoot::from_args())
}
