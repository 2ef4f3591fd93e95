fn main() -> miette::Result<()> {
    jsongen::cli::run()
}
