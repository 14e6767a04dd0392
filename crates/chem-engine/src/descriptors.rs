//! Bundled scalar/vector descriptors beyond the headline mw/logp/tpsa
//! (spec §4.1: ring/rotatable-bond/donor/acceptor counts, Lipinski
//! violations, QED, Bertz index, Chi/Kappa indices, Labute ASA, VSA
//! vectors).

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeDescriptors {
    pub atom_count: u32,
    pub heavy_atom_count: u32,
    pub ring_count: u32,
    pub rotatable_bond_count: u32,
    pub h_donor_count: u32,
    pub h_acceptor_count: u32,
    pub lipinski_violations: u32,
    pub qed: f64,
    pub bertz_ct: f64,
    pub chi0: f64,
    pub chi1: f64,
    pub kappa1: f64,
    pub kappa2: f64,
    pub kappa3: f64,
    pub labute_asa: f64,
    pub peoe_vsa: Vec<f64>,
    pub smr_vsa: Vec<f64>,
}
