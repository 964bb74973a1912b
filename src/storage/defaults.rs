//! Built-in profiles seeded into a new profile store.

use crate::config::Preset;
use crate::cooling::Channel;
use crate::storage::types::StoredProfile;

/// Silent, Performance and Fixed for each channel, numbered from 1.
pub fn default_profiles() -> Vec<StoredProfile> {
    let mut profiles = Vec::new();

    for channel in Channel::ALL {
        for preset in Preset::ALL {
            profiles.push(StoredProfile {
                id: profiles.len() as u32 + 1,
                channel,
                name: preset.name().to_string(),
                read_only: preset.read_only(),
                single_step: preset == Preset::Fixed,
                steps: preset.steps(channel),
            });
        }
    }

    profiles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profiles() {
        let profiles = default_profiles();
        assert_eq!(profiles.len(), 6);

        let ids: Vec<u32> = profiles.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

        let fixed_pump = profiles
            .iter()
            .find(|p| p.channel == Channel::Pump && p.single_step)
            .unwrap();
        assert_eq!(fixed_pump.name, "Fixed");
        assert_eq!(fixed_pump.steps, vec![(20, 30)]);
        assert!(!fixed_pump.read_only);

        assert_eq!(profiles.iter().filter(|p| p.read_only).count(), 4);
    }
}
