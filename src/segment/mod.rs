// Sentence segmentation — trait-based so the splitter can be swapped
// (e.g. for a language-specific or model-based sentencizer) without touching
// selection or assembly.

pub mod rules;
pub mod traits;
