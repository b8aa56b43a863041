fn main() {
    xojo_outline_lib::run()
}
