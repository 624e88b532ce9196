/// Vehicle classes recognized by the gate counter.
///
/// Class ids follow the detector's label space (COCO ids, plus 80 for
/// ambulances from the fine-tuned head). Anything else resolves to
/// [`VehicleClass::Unknown`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleClass {
    Bicycle,
    Car,
    Motorcycle,
    Truck,
    Ambulance,
    #[default]
    Unknown,
}

impl VehicleClass {
    /// Every class except the `Unknown` sentinel.
    pub const RECOGNIZED: [VehicleClass; 5] = [
        VehicleClass::Bicycle,
        VehicleClass::Car,
        VehicleClass::Motorcycle,
        VehicleClass::Truck,
        VehicleClass::Ambulance,
    ];

    pub fn from_class_id(class_id: i64) -> Self {
        match class_id {
            1 => Self::Bicycle,
            2 => Self::Car,
            3 => Self::Motorcycle,
            7 => Self::Truck,
            80 => Self::Ambulance,
            _ => Self::Unknown,
        }
    }

    pub fn class_id(&self) -> Option<i64> {
        match self {
            Self::Bicycle => Some(1),
            Self::Car => Some(2),
            Self::Motorcycle => Some(3),
            Self::Truck => Some(7),
            Self::Ambulance => Some(80),
            Self::Unknown => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Bicycle => "Bicycle",
            Self::Car => "Car",
            Self::Motorcycle => "Motorcycle",
            Self::Truck => "Truck",
            Self::Ambulance => "Ambulance",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for VehicleClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_id_mapping() {
        for class in VehicleClass::RECOGNIZED {
            let id = class.class_id().unwrap();
            assert_eq!(VehicleClass::from_class_id(id), class);
        }
        assert_eq!(VehicleClass::from_class_id(0), VehicleClass::Unknown);
        assert_eq!(VehicleClass::from_class_id(-3), VehicleClass::Unknown);
        assert_eq!(VehicleClass::Unknown.class_id(), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(VehicleClass::Car.to_string(), "Car");
        assert_eq!(VehicleClass::from_class_id(42).label(), "Unknown");
    }
}
