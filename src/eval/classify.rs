use crate::spec::model::Layer;

/// A spec's layers split into cached (static) and per-frame (dynamic) sets.
///
/// Both sets preserve the original relative order of their members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedLayers {
    /// Layers without animations, drawn once into the static buffer.
    pub static_layers: Vec<Layer>,
    /// Layers with at least one animation, evaluated every drawn frame.
    pub dynamic_layers: Vec<Layer>,
}

impl ClassifiedLayers {
    /// Total number of layers across both sets.
    pub fn len(&self) -> usize {
        self.static_layers.len() + self.dynamic_layers.len()
    }

    /// Return `true` when there is nothing to draw.
    pub fn is_empty(&self) -> bool {
        self.static_layers.is_empty() && self.dynamic_layers.is_empty()
    }
}

/// Partition layers by whether their animation list is non-empty.
pub fn classify_layers(layers: &[Layer]) -> ClassifiedLayers {
    let (dynamic_layers, static_layers): (Vec<Layer>, Vec<Layer>) =
        layers.iter().cloned().partition(Layer::is_dynamic);
    ClassifiedLayers {
        static_layers,
        dynamic_layers,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/classify.rs"]
mod tests;
