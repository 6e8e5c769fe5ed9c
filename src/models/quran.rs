use serde::{Deserialize, Serialize};

use crate::error::RewardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuranActivity {
    Read,
    Listen,
}

impl QuranActivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuranActivity::Read => "read",
            QuranActivity::Listen => "listen",
        }
    }

    /// Each ayah read or listened to earns one reward.
    pub fn rewards_for(&self, ayahs: u32) -> u64 {
        ayahs as u64
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuranLog {
    pub date: String,
    pub ayahs_read: u32,
    pub ayahs_listened: u32,
}

impl DailyQuranLog {
    pub fn total(&self) -> u32 {
        self.ayahs_read + self.ayahs_listened
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardTally {
    pub earned: u64,
    pub redeemed: u64,
}

impl RewardTally {
    pub fn available(&self) -> u64 {
        self.earned.saturating_sub(self.redeemed)
    }

    pub fn redeem(&mut self, amount: u64) -> Result<(), RewardError> {
        let available = self.available();
        if amount > available {
            return Err(RewardError::Insufficient {
                requested: amount,
                available,
            });
        }
        self.redeemed += amount;
        Ok(())
    }
}
