pub mod model;
pub mod one_or_many;
pub mod xref;

pub use model::{
    Jmdict, JmdictGloss, JmdictKana, JmdictKanji, JmdictMetadata, JmdictSense, JmdictWord,
};
pub use one_or_many::OneOrMany;
pub use xref::Xref;
