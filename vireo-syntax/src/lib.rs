/*!
A low-level crate for reading PDF content streams.

This crate takes decoded content-stream bytes and splits them into
instructions: the operands accumulated since the last operator, plus the
operator keyword itself. It knows nothing about graphics state or resources;
interpreting the instructions is the job of `vireo-interpret`.

The parsers are written to survive adversarial input: a malformed token is
reported as a structured error and the lexer resynchronizes, so one corrupt
byte never takes down the rest of the stream.
*/

pub mod byte_reader;
pub mod content;
pub mod object;

pub(crate) mod reader;
pub(crate) mod trivia;

pub use byte_reader::Reader;
