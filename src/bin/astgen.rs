// astgen command-line entry point
// Usage: astgen file <PATH> | astgen string <SOURCE> | astgen batch <ROOT> --output <PREFIX>

fn main() {
    astgen::cli::run();
}
