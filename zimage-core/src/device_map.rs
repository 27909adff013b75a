/// Where a loader should place the model weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeviceMap {
    ForceCpu,
    Ordinal(usize),
}

impl DeviceMap {
    pub fn from_cpu_flag(cpu: bool) -> Self {
        if cpu {
            Self::ForceCpu
        } else {
            Self::default()
        }
    }
}

impl Default for DeviceMap {
    fn default() -> Self {
        Self::Ordinal(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_flag_forces_cpu() {
        assert_eq!(DeviceMap::from_cpu_flag(true), DeviceMap::ForceCpu);
        assert_eq!(DeviceMap::from_cpu_flag(false), DeviceMap::Ordinal(0));
    }
}
