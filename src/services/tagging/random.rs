use image::DynamicImage;
use rand::seq::SliceRandom;

use super::Tagger;

/// Placeholder tagger that ignores the image and picks a label uniformly
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomTagger;

impl Tagger for RandomTagger {
    fn label(&self, _image: &DynamicImage, _attribute: &str, labels: &[String]) -> Option<String> {
        labels.choose(&mut rand::thread_rng()).cloned()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
