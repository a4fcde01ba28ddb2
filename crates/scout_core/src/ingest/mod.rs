pub mod arxiv_atom;
