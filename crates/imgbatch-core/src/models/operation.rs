use serde::{Deserialize, Serialize};

/// A single pending transform, recorded locally and applied by the remote processor.
///
/// Serialized with an `action` tag, e.g. `{"action":"resize","width":100,"height":75}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Operation {
    Resize {
        width: u32,
        height: u32,
    },
    Crop {
        src_x: u32,
        src_y: u32,
        src_width: u32,
        src_height: u32,
        destination_width: Option<u32>,
        destination_height: Option<u32>,
    },
    Rotate {
        angle: f64,
    },
    Flip {
        horizontal: bool,
        vertical: bool,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Resize { .. } => "resize",
            Operation::Crop { .. } => "crop",
            Operation::Rotate { .. } => "rotate",
            Operation::Flip { .. } => "flip",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resize_wire_shape() {
        let op = Operation::Resize {
            width: 100,
            height: 75,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"action": "resize", "width": 100, "height": 75})
        );
    }

    #[test]
    fn test_crop_without_destination_serializes_nulls() {
        let op = Operation::Crop {
            src_x: 10,
            src_y: 10,
            src_width: 100,
            src_height: 50,
            destination_width: None,
            destination_height: None,
        };
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({
                "action": "crop",
                "src_x": 10,
                "src_y": 10,
                "src_width": 100,
                "src_height": 50,
                "destination_width": null,
                "destination_height": null
            })
        );
    }

    #[test]
    fn test_rotate_and_flip_wire_shape() {
        assert_eq!(
            serde_json::to_value(Operation::Rotate { angle: 90.0 }).unwrap(),
            json!({"action": "rotate", "angle": 90.0})
        );
        assert_eq!(
            serde_json::to_value(Operation::Flip {
                horizontal: true,
                vertical: false
            })
            .unwrap(),
            json!({"action": "flip", "horizontal": true, "vertical": false})
        );
    }
}
