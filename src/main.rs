//! # Scene
//!
//! Interactive front end for the scene scripting language.
//!

fn main() {
    scene::term::main()
}
