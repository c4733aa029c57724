use super::super::types::TimeOfDay;
use serde::{Deserialize, Serialize};

/// Probability that a caller picks up a callback, by whole minutes elapsed since the call (minute 1 first)
const DAY_AVAILABILITY: [f64; 75] = [
    0.92845048648516, 0.92845048648516, 0.904322486644002, 0.920465217077223, 0.923540213000367,
    0.925319546172627, 0.928084029747757, 0.931666666666667, 0.927807486631016, 0.933756890591423,
    0.937177733347364, 0.926475871153155, 0.929320817228051, 0.931859730762839, 0.931657355679702,
    0.931808644565674, 0.935081148564295, 0.92779888921368, 0.933917488134356, 0.933113129644922,
    0.930668016194332, 0.919109663409338, 0.918280871670702, 0.924231593995711, 0.931122448979592,
    0.932075471698113, 0.945220193340494, 0.936085219707057, 0.947284345047923, 0.933333333333333,
    0.917089678510998, 0.931392931392931, 0.92, 0.924944812362031, 0.93029490616622,
    0.941176470588235, 0.938983050847458, 0.929824561403509, 0.929752066115703, 0.956310679611651,
    0.921658986175115, 0.950495049504951, 0.901098901098901, 0.941935483870968, 0.92156862745098,
    0.898305084745763, 0.909090909090909, 0.951219512195122, 0.91588785046729, 0.913461538461538,
    0.952941176470588, 0.974358974358974, 0.867647058823529, 0.971014492753623, 0.966101694915254,
    0.957142857142857, 0.927272727272727, 0.864864864864865, 0.96875, 0.636363636363636,
    0.875, 0.888888888888889, 1.0, 1.0, 1.0,
    1.0, 1.0, 1.0, 1.0, 0.5,
    1.0, 1.0, 1.0, 1.0, 1.0,
];

const EVENING_AVAILABILITY: [f64; 75] = [
    0.933064875582128, 0.933064875582128, 0.917647058823529, 0.905806451612903, 0.930602957906712,
    0.932584269662921, 0.936858721389108, 0.938760806916427, 0.934244791666667, 0.944036178631996,
    0.947206560738083, 0.939990162321692, 0.93740972556572, 0.932987258140632, 0.933551708001872,
    0.943421643466547, 0.939557961208841, 0.944870565675935, 0.933145009416196, 0.947761194029851,
    0.931989924433249, 0.938378378378378, 0.938695163104612, 0.932546374367622, 0.932632880098888,
    0.92667898952557, 0.919741100323625, 0.929752066115703, 0.933726067746686, 0.926076360682372,
    0.93015332197615, 0.930491195551437, 0.917657822506862, 0.933399602385686, 0.929012345679012,
    0.929844097995546, 0.93208430913349, 0.906976744186047, 0.933414043583535, 0.940939597315436,
    0.931623931623932, 0.929712460063898, 0.934189406099519, 0.927536231884058, 0.929982046678636,
    0.936416184971098, 0.929824561403509, 0.948979591836735, 0.934977578475336, 0.940265486725664,
    0.915816326530612, 0.920096852300242, 0.91740412979351, 0.921511627906977, 0.927027027027027,
    0.916129032258065, 0.92485549132948, 0.947019867549669, 0.924731182795699, 0.865771812080537,
    0.926315789473684, 0.913461538461538, 0.87012987012987, 0.8625, 0.942307692307692,
    0.791666666666667, 0.959183673469388, 0.840909090909091, 0.78125, 0.852941176470588,
    0.833333333333333, 0.782608695652174, 0.9, 0.666666666666667, 0.5,
];

/// Empirical per-minute callback availability for each time-of-day bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityCurve {
    pub day: Vec<f64>,
    pub evening: Vec<f64>,
}

impl AvailabilityCurve {
    pub fn new(day: Vec<f64>, evening: Vec<f64>) -> Self {
        Self { day, evening }
    }

    /// Same probability for every minute and bucket
    pub fn constant(probability: f64, minutes: usize) -> Self {
        Self {
            day: vec![probability; minutes],
            evening: vec![probability; minutes],
        }
    }

    /// Number of minutes covered by both buckets
    pub fn minutes(&self) -> usize {
        self.day.len().min(self.evening.len())
    }

    fn bucket(&self, time_of_day: TimeOfDay) -> &[f64] {
        match time_of_day {
            TimeOfDay::Day => &self.day,
            TimeOfDay::Evening => &self.evening,
        }
    }

    /// Availability at `minute` (one-based), clamped into the covered range
    pub fn probability(&self, minute: usize, time_of_day: TimeOfDay) -> f64 {
        let curve = self.bucket(time_of_day);
        if curve.is_empty() {
            return 0.0;
        }
        let minute = minute.clamp(1, curve.len());
        curve[minute - 1]
    }
}

impl Default for AvailabilityCurve {
    fn default() -> Self {
        Self {
            day: DAY_AVAILABILITY.to_vec(),
            evening: EVENING_AVAILABILITY.to_vec(),
        }
    }
}
