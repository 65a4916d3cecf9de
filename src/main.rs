//! cats main entrypoint.

use cats::run;
use cats::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(e);
        std::process::exit(1);
    }
}
