pub mod interstitial;
pub mod tabular;
