mod bullet_points;
mod prompt;
mod spinner;

pub use bullet_points::{BulletPointPrinter, LineWriter, StdoutLineWriter};
#[cfg(test)]
pub use bullet_points::BufferLineWriter;
pub use prompt::{prompt, prompt_select, prompt_yes_no};
pub use spinner::with_spinner;
