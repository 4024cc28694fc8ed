//! The active parser for a request, modeled as a sum type that is
//! replaced wholesale on each state transition rather than a trait object
//! swapped behind a pointer.

pub mod body;
pub mod head;

pub use self::body::BodyParser;
pub use self::head::HeadParser;

pub enum Parser {
    Head(HeadParser),
    Body(BodyParser),
    Done,
}

impl Parser {
    pub fn new_head() -> Parser {
        Parser::Head(HeadParser::new())
    }
}
